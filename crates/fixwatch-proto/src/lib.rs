pub mod wire;

pub use wire::{classify, parse_position, FeedLine, PositionFix, WireError};
