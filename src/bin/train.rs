// src/bin/train.rs
use anyhow::Result;
use clap::Parser;

use burn::tensor::backend::Backend;
use burn_autodiff::Autodiff;
use burn_ndarray::NdArray;

use reelrec::training::load_config;
use reelrec::{fit, FitConfig, MatrixFactorizationConfig, Ml100k, RatingTask, RunTracker};

/// Train the biased matrix-factorization rating model on ML-100K ratings.
#[derive(Parser, Debug)]
#[command(name = "train", version, about = "Latent-factor recommender trainer")]
struct Args {
    /// Latent dimensionality of the factor tables [default: 30]
    #[arg(long)]
    embedding_dims: Option<usize>,

    /// Training batch size [default: 512]
    #[arg(long)]
    batch_size: Option<usize>,

    /// Optional TOML run config; flags override its values
    #[arg(long)]
    config: Option<String>,

    /// Ratings file (ML-100K u.data format)
    #[arg(long)]
    ratings: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut cfg = match &args.config {
        Some(path) => load_config(path)?,
        None => FitConfig::default(),
    };
    if let Some(dims) = args.embedding_dims {
        cfg.model.embedding_dims = dims;
    }
    if let Some(batch_size) = args.batch_size {
        cfg.train.batch_size = batch_size;
    }
    if let Some(ratings) = args.ratings {
        cfg.data.ratings_path = ratings;
    }

    type B = Autodiff<NdArray<f32>>;
    let device = <B as Backend>::Device::default();

    let data = Ml100k::load(&cfg.data.ratings_path)?;
    eprintln!(
        "[data] {} ratings | {} users | {} items",
        data.len(),
        data.num_users(),
        data.num_items()
    );
    let (train_rows, valid_rows) = data.split(cfg.data.valid_fraction, cfg.seed);

    let model = MatrixFactorizationConfig::new(
        cfg.model.embedding_dims,
        data.num_users(),
        data.num_items(),
    )
    .with_sparse(cfg.model.sparse)
    .init::<B>(&device);
    let task = RatingTask::new(model);

    let mut tracker = if cfg.tracker.enabled {
        Some(RunTracker::create(&cfg.tracker.dir, &cfg.tracker.project)?)
    } else {
        None
    };

    let (_task, metrics) = fit::<B, _>(
        task,
        &train_rows,
        &valid_rows,
        &cfg,
        &device,
        tracker.as_mut(),
    )?;

    println!(
        "train_rmse={:.4} valid_rmse={:.4}",
        metrics.train_rmse.value(),
        metrics.valid_rmse.value()
    );
    Ok(())
}
