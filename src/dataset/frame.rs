//! Named-column numeric frame with NaN as the missing-value marker.

use serde::{Deserialize, Serialize};

use super::DatasetError;
use crate::types::SensorReading;

/// Rows of `f64` values addressed by column name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorFrame {
    columns: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl SensorFrame {
    /// Build a frame, checking every row has one value per column.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<f64>>) -> Result<Self, DatasetError> {
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != columns.len()) {
            return Err(DatasetError::RowWidth {
                row: i,
                expected: columns.len(),
                found: row.len(),
            });
        }
        Ok(Self { columns, rows })
    }

    /// One-row frame with columns `Sensor-1` .. `Sensor-10`.
    pub fn from_reading(reading: &SensorReading) -> Self {
        let (columns, values): (Vec<String>, Vec<f64>) = reading.named_values().into_iter().unzip();
        Self { columns, rows: vec![values] }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Vec<f64>> {
        self.rows
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// All values of one column.
    pub fn column(&self, name: &str) -> Result<Vec<f64>, DatasetError> {
        let idx = self
            .column_index(name)
            .ok_or_else(|| DatasetError::MissingColumn(name.to_string()))?;
        Ok(self.rows.iter().map(|r| r[idx]).collect())
    }

    /// Project onto `names`, in that order. Every column must exist.
    pub fn select(&self, names: &[String]) -> Result<Self, DatasetError> {
        let indices = names
            .iter()
            .map(|n| {
                self.column_index(n)
                    .ok_or_else(|| DatasetError::MissingColumn(n.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.project(names, &indices.into_iter().map(Some).collect::<Vec<_>>()))
    }

    /// Project onto `names`, filling columns this frame lacks with NaN.
    ///
    /// Returns the projected frame and the names that had to be padded.
    pub fn select_or_pad(&self, names: &[String]) -> (Self, Vec<String>) {
        let indices: Vec<Option<usize>> = names.iter().map(|n| self.column_index(n)).collect();
        let padded = names
            .iter()
            .zip(indices.iter())
            .filter(|(_, idx)| idx.is_none())
            .map(|(n, _)| n.clone())
            .collect();
        (self.project(names, &indices), padded)
    }

    /// Frame without the listed columns. Names not present are ignored.
    pub fn drop_columns(&self, names: &[String]) -> Self {
        let keep: Vec<String> = self
            .columns
            .iter()
            .filter(|c| !names.contains(c))
            .cloned()
            .collect();
        let indices: Vec<Option<usize>> = keep.iter().map(|n| self.column_index(n)).collect();
        self.project(&keep, &indices)
    }

    /// Rows at the given positions, in that order.
    pub fn take_rows(&self, indices: &[usize]) -> Self {
        Self {
            columns: self.columns.clone(),
            rows: indices.iter().map(|&i| self.rows[i].clone()).collect(),
        }
    }

    fn project(&self, names: &[String], indices: &[Option<usize>]) -> Self {
        let rows = self
            .rows
            .iter()
            .map(|row| {
                indices
                    .iter()
                    .map(|idx| idx.map_or(f64::NAN, |i| row[i]))
                    .collect()
            })
            .collect();
        Self {
            columns: names.to_vec(),
            rows,
        }
    }
}
