/// Running root-mean-squared-error over any number of batches.
#[derive(Clone, Debug, Default)]
pub struct RunningRmse {
    sum_squared: f64,
    count: usize,
}

impl RunningRmse {
    pub fn update(&mut self, predictions: &[f32], targets: &[f32]) {
        debug_assert_eq!(predictions.len(), targets.len());
        for (p, t) in predictions.iter().zip(targets) {
            let diff = (p - t) as f64;
            self.sum_squared += diff * diff;
        }
        self.count += predictions.len();
    }

    /// 0.0 before any update, matching an untouched accumulator.
    pub fn value(&self) -> f32 {
        if self.count == 0 {
            return 0.0;
        }
        (self.sum_squared / self.count as f64).sqrt() as f32
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn reset(&mut self) {
        self.sum_squared = 0.0;
        self.count = 0;
    }
}

/// The two per-partition accumulators. Owned by the trainer, which resets
/// them at the start of every epoch; the task only feeds them.
#[derive(Clone, Debug, Default)]
pub struct FitMetrics {
    pub train_rmse: RunningRmse,
    pub valid_rmse: RunningRmse,
}

impl FitMetrics {
    pub fn reset(&mut self) {
        self.train_rmse.reset();
        self.valid_rmse.reset();
    }
}
