use burn::tensor::backend::Backend;
use burn_autodiff::Autodiff;
use burn_ndarray::NdArray;

use reelrec::training::{FitTask, RunningRmse};
use reelrec::{
    fit, FitConfig, FitMetrics, Interaction, MatrixFactorizationConfig, Partition, RatingBatcher,
    RatingTask,
};

type B = Autodiff<NdArray<f32>>;

/// Full (user, item) grid with ratings in 1..=5 that follow the ids, so a
/// biased factorization can actually fit them.
fn synthetic_ratings() -> Vec<Interaction> {
    let mut rows = Vec::new();
    for user in 0..6 {
        for item in 0..5 {
            rows.push(Interaction {
                user,
                item,
                rating: 1.0 + ((user + 2 * item) % 5) as f32,
            });
        }
    }
    rows
}

fn smoke_config(ckpt_dir: &str) -> FitConfig {
    let mut cfg = FitConfig::default();
    cfg.seed = 7;
    cfg.model.embedding_dims = 4;
    cfg.train.batch_size = 8;
    cfg.train.max_epochs = 20;
    cfg.train.lr = 0.05;
    cfg.train.log_every = 10_000; // keep test output quiet
    cfg.checkpoints.dir = ckpt_dir.to_string();
    cfg
}

fn rmse_over<M: FitTask<B>>(task: &M, rows: &[Interaction], device: &<B as Backend>::Device) -> f32 {
    let batcher = RatingBatcher::new(8, 0);
    let mut rmse = RunningRmse::default();
    for batch in batcher.sequential_batches::<B>(rows, device) {
        let predictions = task.forward(&batch);
        let predicted = predictions.to_data().as_slice::<f32>().unwrap().to_vec();
        let observed = batch.ratings.to_data().as_slice::<f32>().unwrap().to_vec();
        rmse.update(&predicted, &observed);
    }
    rmse.value()
}

#[test]
fn train_and_valid_accumulators_are_independent() {
    let device = Default::default();
    let model = MatrixFactorizationConfig::new(2, 6, 5).init::<B>(&device);
    let task = RatingTask::new(model);
    let mut metrics = FitMetrics::default();

    let rows = synthetic_ratings();
    let batcher = RatingBatcher::new(8, 0);
    for batch in batcher.sequential_batches::<B>(&rows, &device) {
        let predictions = task.forward(&batch);
        task.update_metric(&predictions, &batch, Partition::Train, &mut metrics);
    }

    assert!(metrics.train_rmse.count() > 0);
    assert!(metrics.train_rmse.value() > 0.0);
    // Nothing was fed to the validation side.
    assert_eq!(metrics.valid_rmse.count(), 0);
    assert_eq!(metrics.valid_rmse.value(), 0.0);

    let train_before = metrics.train_rmse.value();
    let batches = batcher.sequential_batches::<B>(&rows, &device);
    let batch = &batches[0];
    let predictions = task.forward(batch);
    task.update_metric(&predictions, batch, Partition::Valid, &mut metrics);
    // And the reverse direction leaves the training side untouched.
    assert_eq!(metrics.train_rmse.value(), train_before);
    assert!(metrics.valid_rmse.count() > 0);
}

#[test]
fn fit_reduces_training_rmse_and_checkpoints_on_best() {
    let device = Default::default();
    let ckpt_dir = tempfile::tempdir().unwrap();
    let cfg = smoke_config(ckpt_dir.path().to_str().unwrap());

    let rows = synthetic_ratings();
    let (train_rows, valid_rows) = rows.split_at(24);

    <B as Backend>::seed(cfg.seed);
    let model =
        MatrixFactorizationConfig::new(cfg.model.embedding_dims, 6, 5).init::<B>(&device);
    let task = RatingTask::new(model);

    let rmse_untrained = rmse_over(&task, train_rows, &device);

    let (trained, metrics) =
        fit::<B, _>(task, train_rows, valid_rows, &cfg, &device, None).unwrap();

    let rmse_trained = rmse_over(&trained, train_rows, &device);
    assert!(
        rmse_trained < rmse_untrained,
        "training did not help: {rmse_trained} vs untrained {rmse_untrained}"
    );
    assert!(metrics.train_rmse.value().is_finite());
    assert!(metrics.valid_rmse.count() > 0);

    // Validation improved at least once, so at least one record exists.
    let checkpoints: Vec<_> = std::fs::read_dir(ckpt_dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with("mf_epoch") && name.ends_with(".bin"))
        .collect();
    assert!(!checkpoints.is_empty(), "no checkpoint was recorded");
}

#[test]
fn empty_validation_set_disables_best_tracking() {
    let device = Default::default();
    let mut cfg = smoke_config("");
    cfg.train.max_epochs = 2;

    let rows = synthetic_ratings();
    let model =
        MatrixFactorizationConfig::new(cfg.model.embedding_dims, 6, 5).init::<B>(&device);
    let task = RatingTask::new(model);

    let (_trained, metrics) = fit::<B, _>(task, &rows, &[], &cfg, &device, None).unwrap();
    assert_eq!(metrics.valid_rmse.count(), 0);
}
