//! Track geometry, traversal and layout.
//!
//! Pieces are placed on the [`TileMap`](crate::world::TileMap) as one element
//! per block. [`TrackGraph`] derives next/previous piece queries from the
//! static piece table, and the circuit helpers build gap detection and the
//! test run on top of it.
mod circuit;
mod elements;
mod graph;
mod layout;
mod survey;

pub use circuit::{CircuitIterator, find_gap, find_piece, track_back, track_front};
pub use elements::{TrackBlock, TrackElemType, TrackFlags, TrackPieceDef};
pub use graph::{TrackGraph, TrackPiece, local_to_world};
pub use layout::{LayoutBuilder, LayoutError, PlacedLayout, PlacedStation};
pub use survey::{SegmentSurvey, SurveyReport, is_sheltered, survey_circuit};
