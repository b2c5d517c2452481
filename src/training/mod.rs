pub mod config;
pub mod metric;
pub mod task;
pub mod tracker;
pub mod trainer;

pub use config::{load_config, FitConfig};
pub use metric::{FitMetrics, RunningRmse};
pub use task::{FitTask, Partition, RatingTask};
pub use tracker::RunTracker;
pub use trainer::fit;
