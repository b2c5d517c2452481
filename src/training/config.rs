use anyhow::{Context, Result};
use serde::Deserialize;

/// Full run configuration. Every table has code-level defaults so the
/// trainer runs with no file at all; a TOML file overrides per field.
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct FitConfig {
    pub seed: u64,
    pub model: ModelCfg,
    pub train: TrainKnobs,
    pub data: DataCfg,
    pub checkpoints: CkptCfg,
    pub tracker: TrackerCfg,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ModelCfg {
    pub embedding_dims: usize,
    pub sparse: bool,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct TrainKnobs {
    pub batch_size: usize,
    pub max_epochs: usize,
    pub lr: f64,
    pub weight_decay: f64,
    pub log_every: usize,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct DataCfg {
    pub ratings_path: String,
    pub valid_fraction: f32,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct CkptCfg {
    /// Empty string disables checkpointing.
    pub dir: String,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct TrackerCfg {
    pub dir: String,
    /// Destination project for metric records; switch here to log a run
    /// under a different experiment.
    pub project: String,
    pub enabled: bool,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            model: ModelCfg::default(),
            train: TrainKnobs::default(),
            data: DataCfg::default(),
            checkpoints: CkptCfg::default(),
            tracker: TrackerCfg::default(),
        }
    }
}

impl Default for ModelCfg {
    fn default() -> Self {
        Self {
            embedding_dims: 30,
            sparse: false,
        }
    }
}

impl Default for TrainKnobs {
    fn default() -> Self {
        Self {
            batch_size: 512,
            max_epochs: 30,
            lr: 1e-3,
            weight_decay: 0.0,
            log_every: 50,
        }
    }
}

impl Default for DataCfg {
    fn default() -> Self {
        Self {
            ratings_path: "data/ml-100k/u.data".to_string(),
            valid_fraction: 0.1,
        }
    }
}

impl Default for CkptCfg {
    fn default() -> Self {
        Self {
            dir: "checkpoints".to_string(),
        }
    }
}

impl Default for TrackerCfg {
    fn default() -> Self {
        Self {
            dir: "runs".to_string(),
            project: "recsys".to_string(),
            enabled: true,
        }
    }
}

pub fn load_config(path: &str) -> Result<FitConfig> {
    let txt = std::fs::read_to_string(path).with_context(|| format!("reading config {path}"))?;
    toml::from_str::<FitConfig>(&txt).with_context(|| format!("parsing config {path}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_training_script() {
        let cfg = FitConfig::default();
        assert_eq!(cfg.model.embedding_dims, 30);
        assert_eq!(cfg.train.batch_size, 512);
        assert_eq!(cfg.train.max_epochs, 30);
        assert!(!cfg.model.sparse);
    }

    #[test]
    fn partial_toml_overrides_only_named_fields() {
        let cfg: FitConfig = toml::from_str(
            "[model]\nembedding_dims = 8\n\n[tracker]\nproject = \"scratch\"\n",
        )
        .unwrap();
        assert_eq!(cfg.model.embedding_dims, 8);
        assert_eq!(cfg.tracker.project, "scratch");
        // untouched tables keep their defaults
        assert_eq!(cfg.train.batch_size, 512);
        assert_eq!(cfg.data.valid_fraction, 0.1);
    }
}
