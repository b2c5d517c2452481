pub mod data;
pub mod model;
pub mod training;

pub use data::{Interaction, Ml100k, RatingBatch, RatingBatcher};
pub use model::{MatrixFactorization, MatrixFactorizationConfig};
pub use training::{fit, FitConfig, FitMetrics, FitTask, Partition, RatingTask, RunTracker};
