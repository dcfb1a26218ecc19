//! Doubling cube.

pub mod state;

pub use state::{CubeContext, CubeState, DoubleDeclined, INITIAL_CUBE_VALUE};
