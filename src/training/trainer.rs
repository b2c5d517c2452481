use std::path::PathBuf;

use anyhow::Result;
use burn::{
    module::AutodiffModule,
    optim::{AdamWConfig, GradientsParams, Optimizer},
    record::{CompactRecorder, Recorder},
    tensor::backend::{AutodiffBackend, Backend},
};

use crate::data::{Interaction, RatingBatcher};
use crate::training::config::FitConfig;
use crate::training::metric::FitMetrics;
use crate::training::task::{FitTask, Partition};
use crate::training::tracker::RunTracker;

/// Epoch-driven fit loop. Owns the optimizer, both RMSE accumulators
/// (reset at every epoch start), the validation pass, logging, and
/// best-validation checkpointing. Returns the trained task and the final
/// epoch's metrics.
pub fn fit<B, M>(
    mut task: M,
    train_rows: &[Interaction],
    valid_rows: &[Interaction],
    cfg: &FitConfig,
    device: &B::Device,
    mut tracker: Option<&mut RunTracker>,
) -> Result<(M, FitMetrics)>
where
    B: AutodiffBackend,
    M: AutodiffModule<B> + FitTask<B>,
{
    <B as Backend>::seed(cfg.seed);

    let mut opt = AdamWConfig::new()
        .with_weight_decay(cfg.train.weight_decay as f32)
        .init::<B, M>();
    let mut batcher = RatingBatcher::new(cfg.train.batch_size, cfg.seed);
    let mut metrics = FitMetrics::default();

    let mut best_rmse = f32::INFINITY;
    let mut best_epoch = 0usize;

    for epoch in 1..=cfg.train.max_epochs {
        metrics.reset();
        let mut loss_sum = 0.0f32;
        let mut loss_cnt = 0usize;

        let batches = batcher.shuffled_batches::<B>(train_rows, device);
        let num_batches = batches.len();
        for (i, batch) in batches.into_iter().enumerate() {
            let predictions = task.forward(&batch);
            task.update_metric(&predictions, &batch, Partition::Train, &mut metrics);
            let loss = task.loss(predictions, &batch);

            let loss_value = loss.clone().to_data().as_slice::<f32>().unwrap()[0];
            loss_sum += loss_value;
            loss_cnt += 1;
            if (i + 1) % cfg.train.log_every == 0 {
                eprintln!(
                    "[epoch {epoch} | batch {}/{}] loss={loss_value:.4} rmse={:.4}",
                    i + 1,
                    num_batches,
                    metrics.train_rmse.value()
                );
            }

            let grads = GradientsParams::from_grads(loss.backward(), &task);
            task = opt.step(cfg.train.lr, task, grads);
        }

        for batch in batcher.sequential_batches::<B>(valid_rows, device) {
            let predictions = task.forward(&batch);
            task.update_metric(&predictions, &batch, Partition::Valid, &mut metrics);
        }

        let train_rmse = metrics.train_rmse.value();
        let valid_rmse = metrics.valid_rmse.value();
        let mean_loss = if loss_cnt > 0 { loss_sum / loss_cnt as f32 } else { 0.0 };
        eprintln!(
            "[epoch {epoch}] loss={mean_loss:.4} train_rmse={train_rmse:.4} valid_rmse={valid_rmse:.4}"
        );

        if let Some(t) = tracker.as_deref_mut() {
            t.log(epoch, "train/loss", mean_loss)?;
            t.log(epoch, "train/rmse", train_rmse)?;
            t.log(epoch, "valid/rmse", valid_rmse)?;
        }

        if !valid_rows.is_empty() && valid_rmse < best_rmse {
            best_rmse = valid_rmse;
            best_epoch = epoch;
            save_checkpoint(&task, &cfg.checkpoints.dir, epoch)?;
        }
    }

    if best_epoch > 0 {
        eprintln!("[final] best valid_rmse={best_rmse:.4} at epoch {best_epoch}");
    }
    Ok((task, metrics))
}

fn save_checkpoint<B, M>(task: &M, dir: &str, epoch: usize) -> Result<()>
where
    B: AutodiffBackend,
    M: AutodiffModule<B>,
{
    if dir.is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(dir)?;
    let path = PathBuf::from(format!("{dir}/mf_epoch{epoch:03}.bin"));
    CompactRecorder::new().record(task.clone().into_record(), path.clone())?;
    eprintln!("[ckpt] saved {}", path.display());
    Ok(())
}
