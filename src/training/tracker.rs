use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

/// One scalar sent to the tracker.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct MetricRecord {
    pub epoch: usize,
    pub name: String,
    pub value: f32,
    pub logged_at: i64,
}

/// Append-only metric sink: one JSON line per scalar under
/// `<dir>/<project>/<run-id>/metrics.jsonl`.
pub struct RunTracker {
    run_dir: PathBuf,
    file: std::fs::File,
}

impl RunTracker {
    pub fn create(dir: impl AsRef<Path>, project: &str) -> Result<Self> {
        let run_id = Utc::now().format("%Y%m%d-%H%M%S").to_string();
        let run_dir = dir.as_ref().join(project).join(run_id);
        std::fs::create_dir_all(&run_dir)
            .with_context(|| format!("creating run directory {}", run_dir.display()))?;

        let path = run_dir.join("metrics.jsonl");
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("opening {}", path.display()))?;

        eprintln!("[tracker] project={} -> {}", project, run_dir.display());
        Ok(Self { run_dir, file })
    }

    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }

    /// Flushed per call so a killed run keeps everything logged so far.
    pub fn log(&mut self, epoch: usize, name: &str, value: f32) -> Result<()> {
        let record = MetricRecord {
            epoch,
            name: name.to_string(),
            value,
            logged_at: Utc::now().timestamp(),
        };
        let line = serde_json::to_string(&record)?;
        writeln!(self.file, "{line}")?;
        self.file.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::BufRead;

    #[test]
    fn records_round_trip_one_per_line() {
        let dir = tempfile::tempdir().unwrap();
        let mut tracker = RunTracker::create(dir.path(), "unit").unwrap();
        tracker.log(1, "train/rmse", 1.25).unwrap();
        tracker.log(1, "valid/rmse", 1.5).unwrap();

        let path = tracker.run_dir().join("metrics.jsonl");
        let file = std::fs::File::open(path).unwrap();
        let records: Vec<MetricRecord> = std::io::BufReader::new(file)
            .lines()
            .map(|l| serde_json::from_str(&l.unwrap()).unwrap())
            .collect();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "train/rmse");
        assert_eq!(records[0].value, 1.25);
        assert_eq!(records[1].epoch, 1);
    }
}
