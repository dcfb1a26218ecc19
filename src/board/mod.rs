//! Board model and region classifier.
//!
//! - `Point`: tagged occupancy of a single point
//! - `Board`: 24 points, bar, and borne-off trays for both sides
//! - `region`: home/outer classification and pip geometry per side
//! - `PieceSet`: optional per-piece identity tracking

pub mod point;
pub mod region;
pub mod position;
pub mod piece;

pub use point::Point;
pub use region::{
    advance, distance_to_edge, entry_point, home_range, is_in_home_board, region, Region,
    POINT_COUNT,
};
pub use position::{Board, BoardBuilder, Location, PIECES_PER_SIDE};
pub use piece::{Piece, PieceId, PieceSet, PieceState, PIECE_COUNT};
