//! ragbench-text
//!
//! Text segmentation with exact character offsets. `recursive` holds the
//! separator-driven splitter; `adapter` recovers offsets for splitters that
//! only return text.

pub mod adapter;
pub mod recursive;

pub use adapter::{position_aware, PositionAdapter};
pub use recursive::{RecursiveCharacterChunker, RecursiveCharacterOptions};
