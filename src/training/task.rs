use burn::{
    module::Module,
    tensor::{backend::Backend, Tensor},
};

use crate::data::RatingBatch;
use crate::model::MatrixFactorization;
use crate::training::metric::FitMetrics;

/// Which accumulator a metric update feeds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Partition {
    Train,
    Valid,
}

/// The trainer's view of a trainable task: one forward, one loss, one
/// metric hook. The trainer owns sequencing and accumulator lifetimes.
pub trait FitTask<B: Backend> {
    /// Predictions for a batch, ignoring its ground-truth ratings.
    fn forward(&self, batch: &RatingBatch<B>) -> Tensor<B, 1>;

    /// Scalar loss [1] for the batch.
    fn loss(&self, predictions: Tensor<B, 1>, batch: &RatingBatch<B>) -> Tensor<B, 1>;

    /// Feed the partition's running metric with this batch's predictions.
    fn update_metric(
        &self,
        predictions: &Tensor<B, 1>,
        batch: &RatingBatch<B>,
        partition: Partition,
        metrics: &mut FitMetrics,
    );
}

/// Rating-prediction task over the factorization model. A separate Module
/// so the optimizer steps and the recorder checkpoints one bundle.
#[derive(Module, Debug)]
pub struct RatingTask<B: Backend> {
    pub model: MatrixFactorization<B>,
}

impl<B: Backend> RatingTask<B> {
    pub fn new(model: MatrixFactorization<B>) -> Self {
        Self { model }
    }
}

impl<B: Backend> FitTask<B> for RatingTask<B> {
    fn forward(&self, batch: &RatingBatch<B>) -> Tensor<B, 1> {
        self.model
            .forward(batch.users.clone(), batch.items.clone())
    }

    /// Plain mean squared error, no regularization, no weighting.
    fn loss(&self, predictions: Tensor<B, 1>, batch: &RatingBatch<B>) -> Tensor<B, 1> {
        let diff = predictions - batch.ratings.clone();
        (diff.clone() * diff).mean()
    }

    fn update_metric(
        &self,
        predictions: &Tensor<B, 1>,
        batch: &RatingBatch<B>,
        partition: Partition,
        metrics: &mut FitMetrics,
    ) {
        let predicted = predictions.to_data().as_slice::<f32>().unwrap().to_vec();
        let observed = batch.ratings.to_data().as_slice::<f32>().unwrap().to_vec();
        let rmse = match partition {
            Partition::Train => &mut metrics.train_rmse,
            Partition::Valid => &mut metrics.valid_rmse,
        };
        rmse.update(&predicted, &observed);
    }
}
