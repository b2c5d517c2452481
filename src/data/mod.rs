pub mod batcher;
pub mod ml100k;

pub use batcher::{RatingBatch, RatingBatcher};
pub use ml100k::{Interaction, Ml100k};
