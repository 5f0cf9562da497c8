//! Data ingestion: copy the raw dataset into the artifacts directory and
//! split it into train/test CSVs with a seeded shuffle.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use tracing::info;

use super::DatasetError;
use crate::config::{ArtifactsConfig, IngestionConfig};

/// Paths produced by a completed ingestion run.
#[derive(Debug, Clone)]
pub struct IngestionOutput {
    pub raw_path: PathBuf,
    pub train_path: PathBuf,
    pub test_path: PathBuf,
    pub train_rows: usize,
    pub test_rows: usize,
}

/// Splits a raw CSV into `train.csv` / `test.csv`.
///
/// Rows are split as text so the written files keep every original column
/// and cell verbatim.
pub struct DataIngestion<'a> {
    config: &'a IngestionConfig,
    artifacts: &'a ArtifactsConfig,
}

impl<'a> DataIngestion<'a> {
    pub fn new(config: &'a IngestionConfig, artifacts: &'a ArtifactsConfig) -> Self {
        Self { config, artifacts }
    }

    /// Read the configured source and write raw/train/test CSVs.
    pub fn initiate(&self) -> Result<IngestionOutput, DatasetError> {
        self.initiate_from(&self.config.source)
    }

    /// Same as [`initiate`](Self::initiate) with an explicit source file.
    pub fn initiate_from(&self, source: &Path) -> Result<IngestionOutput, DatasetError> {
        info!(source = %source.display(), "Data ingestion started");

        let text = std::fs::read_to_string(source)
            .map_err(|e| DatasetError::Io(source.to_path_buf(), e))?;
        let mut lines = text.lines().filter(|l| !l.trim().is_empty());
        let header = lines.next().ok_or(DatasetError::Empty)?;
        let rows: Vec<&str> = lines.collect();
        if rows.len() < 2 {
            return Err(DatasetError::TooFewRows { needed: 2, found: rows.len() });
        }

        std::fs::create_dir_all(&self.artifacts.dir)
            .map_err(|e| DatasetError::Io(self.artifacts.dir.clone(), e))?;

        let raw_path = self.artifacts.raw_data_path();
        write_lines(&raw_path, header, &rows)?;
        info!(path = %raw_path.display(), rows = rows.len(), "Saved raw dataset copy");

        let (train_idx, test_idx) = split_indices(rows.len(), self.config.test_ratio, self.config.seed);
        let train: Vec<&str> = train_idx.iter().map(|&i| rows[i]).collect();
        let test: Vec<&str> = test_idx.iter().map(|&i| rows[i]).collect();

        let train_path = self.artifacts.train_path();
        let test_path = self.artifacts.test_path();
        write_lines(&train_path, header, &train)?;
        write_lines(&test_path, header, &test)?;

        info!(
            train = %train_path.display(),
            test = %test_path.display(),
            train_rows = train.len(),
            test_rows = test.len(),
            "Data ingestion completed"
        );

        Ok(IngestionOutput {
            raw_path,
            train_path,
            test_path,
            train_rows: train.len(),
            test_rows: test.len(),
        })
    }
}

/// Shuffle `0..n` with `seed` and cut off `ceil(n * ratio)` test indices.
///
/// Both sides always keep at least one row when `n >= 2`.
pub fn split_indices(n: usize, test_ratio: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    let n_test = ((n as f64) * test_ratio).ceil() as usize;
    let n_test = n_test.clamp(1, n.saturating_sub(1).max(1));

    let test = indices.split_off(n - n_test);
    (indices, test)
}

fn write_lines(path: &Path, header: &str, rows: &[&str]) -> Result<(), DatasetError> {
    let mut out = String::with_capacity(header.len() + rows.iter().map(|r| r.len() + 1).sum::<usize>() + 1);
    out.push_str(header);
    out.push('\n');
    for row in rows {
        out.push_str(row);
        out.push('\n');
    }
    std::fs::write(path, out).map_err(|e| DatasetError::Io(path.to_path_buf(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_split_partitions_all_rows() {
        let (train, test) = split_indices(100, 0.2, 42);
        assert_eq!(test.len(), 20);
        assert_eq!(train.len(), 80);
        let all: HashSet<usize> = train.iter().chain(test.iter()).copied().collect();
        assert_eq!(all.len(), 100);
    }

    #[test]
    fn test_split_is_seeded() {
        assert_eq!(split_indices(50, 0.2, 7), split_indices(50, 0.2, 7));
        assert_ne!(split_indices(50, 0.2, 7).1, split_indices(50, 0.2, 8).1);
    }

    #[test]
    fn test_split_keeps_both_sides_nonempty() {
        let (train, test) = split_indices(2, 0.9, 1);
        assert_eq!(train.len(), 1);
        assert_eq!(test.len(), 1);
    }

    #[test]
    fn test_ingestion_writes_files() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("source.csv");
        let mut text = String::from("Sensor-1,Good/Bad\n");
        for i in 0..10 {
            text.push_str(&format!("{i},1\n"));
        }
        std::fs::write(&source, text).unwrap();

        let artifacts = ArtifactsConfig::in_dir(dir.path().join("artifacts"));
        let config = IngestionConfig { source: source.clone(), test_ratio: 0.3, seed: 42 };
        let out = DataIngestion::new(&config, &artifacts).initiate().unwrap();

        assert_eq!(out.train_rows, 7);
        assert_eq!(out.test_rows, 3);
        let train = std::fs::read_to_string(&out.train_path).unwrap();
        assert!(train.starts_with("Sensor-1,Good/Bad\n"));
        assert_eq!(train.lines().count(), 8);
        assert!(out.raw_path.exists());
    }
}
