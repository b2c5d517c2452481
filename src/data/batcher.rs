use burn::tensor::{backend::Backend, Int, Tensor};

use crate::data::Interaction;

/// One training/validation batch: parallel rank-1 tensors of equal length.
#[derive(Clone, Debug)]
pub struct RatingBatch<B: Backend> {
    pub users: Tensor<B, 1, Int>,
    pub items: Tensor<B, 1, Int>,
    pub ratings: Tensor<B, 1>,
}

impl<B: Backend> RatingBatch<B> {
    pub fn from_interactions(rows: &[Interaction], device: &B::Device) -> Self {
        let users: Vec<i32> = rows.iter().map(|r| r.user as i32).collect();
        let items: Vec<i32> = rows.iter().map(|r| r.item as i32).collect();
        let ratings: Vec<f32> = rows.iter().map(|r| r.rating).collect();
        Self {
            users: Tensor::<B, 1, Int>::from_ints(users.as_slice(), device),
            items: Tensor::<B, 1, Int>::from_ints(items.as_slice(), device),
            ratings: Tensor::<B, 1>::from_floats(ratings.as_slice(), device),
        }
    }

    pub fn len(&self) -> usize {
        self.users.dims()[0]
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Chops interaction slices into fixed-size batches. The trailing short
/// batch is emitted, not dropped.
pub struct RatingBatcher {
    batch_size: usize,
    rng: fastrand::Rng,
}

impl RatingBatcher {
    pub fn new(batch_size: usize, seed: u64) -> Self {
        Self {
            batch_size: batch_size.max(1),
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    /// Fresh shuffle order on every call, so each epoch sees the data in a
    /// different order.
    pub fn shuffled_batches<B: Backend>(
        &mut self,
        rows: &[Interaction],
        device: &B::Device,
    ) -> Vec<RatingBatch<B>> {
        let mut order: Vec<usize> = (0..rows.len()).collect();
        self.rng.shuffle(&mut order);

        order
            .chunks(self.batch_size)
            .map(|chunk| {
                let picked: Vec<Interaction> = chunk.iter().map(|&i| rows[i]).collect();
                RatingBatch::from_interactions(&picked, device)
            })
            .collect()
    }

    /// File order, no shuffling. Used for validation passes.
    pub fn sequential_batches<B: Backend>(
        &self,
        rows: &[Interaction],
        device: &B::Device,
    ) -> Vec<RatingBatch<B>> {
        rows.chunks(self.batch_size)
            .map(|chunk| RatingBatch::from_interactions(chunk, device))
            .collect()
    }
}
