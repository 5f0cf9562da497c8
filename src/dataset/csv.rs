//! CSV ingestion into a [`SensorFrame`].
//!
//! Expected layout: one header line, then comma-separated numeric rows.
//! Empty cells and the usual missing markers (`NA`, `NaN`, `null`) become NaN.
//! Blank header cells are named `Unnamed: <index>`, matching exports that
//! carry a leading index column.

use std::collections::BTreeMap;
use std::path::Path;

use super::{DatasetError, SensorFrame};

const MISSING_MARKERS: [&str; 6] = ["", "na", "nan", "null", "none", "n/a"];

/// Read a CSV file into a frame.
pub fn read_csv(path: &Path) -> Result<SensorFrame, DatasetError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| DatasetError::Io(path.to_path_buf(), e))?;
    let frame = parse_csv(&text)?;
    tracing::info!(
        path = %path.display(),
        rows = frame.n_rows(),
        columns = frame.n_cols(),
        "Loaded CSV"
    );
    Ok(frame)
}

/// Parse CSV text into a frame.
pub fn parse_csv(text: &str) -> Result<SensorFrame, DatasetError> {
    let mut lines = text.lines().enumerate();

    let header = loop {
        match lines.next() {
            Some((_, line)) if line.trim().is_empty() => continue,
            Some((_, line)) => break line,
            None => return Err(DatasetError::Empty),
        }
    };
    let columns: Vec<String> = split_fields(header.trim_start_matches('\u{feff}'))
        .enumerate()
        .map(|(i, name)| {
            if name.is_empty() {
                format!("Unnamed: {i}")
            } else {
                name.to_string()
            }
        })
        .collect();

    let mut rows = Vec::new();
    let mut unparsable: BTreeMap<usize, usize> = BTreeMap::new();

    for (line_idx, line) in lines {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = split_fields(line).collect();
        if fields.len() != columns.len() {
            tracing::warn!(
                line = line_idx + 1,
                expected = columns.len(),
                found = fields.len(),
                "Skipping CSV row with wrong field count"
            );
            continue;
        }
        let row = fields
            .iter()
            .enumerate()
            .map(|(col, field)| {
                parse_cell(field).unwrap_or_else(|| {
                    *unparsable.entry(col).or_default() += 1;
                    f64::NAN
                })
            })
            .collect();
        rows.push(row);
    }

    for (col, count) in &unparsable {
        tracing::debug!(column = %columns[*col], count, "Non-numeric cells read as missing");
    }

    SensorFrame::new(columns, rows)
}

fn split_fields(line: &str) -> impl Iterator<Item = &str> {
    line.split(',').map(|f| f.trim().trim_matches('"').trim())
}

/// Parse one cell. Missing markers give `Some(NaN)`; garbage gives `None`.
fn parse_cell(field: &str) -> Option<f64> {
    if MISSING_MARKERS.contains(&field.to_ascii_lowercase().as_str()) {
        return Some(f64::NAN);
    }
    field.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic() {
        let frame = parse_csv("a,b\n1,2\n3.5,-4\n").unwrap();
        assert_eq!(frame.columns(), &["a".to_string(), "b".to_string()]);
        assert_eq!(frame.rows(), &[vec![1.0, 2.0], vec![3.5, -4.0]]);
    }

    #[test]
    fn test_missing_markers_become_nan() {
        let frame = parse_csv("a,b,c\n,NaN,NA\n").unwrap();
        assert!(frame.rows()[0].iter().all(|v| v.is_nan()));
    }

    #[test]
    fn test_blank_header_named_unnamed() {
        let frame = parse_csv(",Sensor-1\n0,1.5\n").unwrap();
        assert_eq!(frame.columns()[0], "Unnamed: 0");
        assert_eq!(frame.column("Sensor-1").unwrap(), vec![1.5]);
    }

    #[test]
    fn test_text_cells_read_as_missing() {
        let frame = parse_csv("Wafers,Sensor-1\nWafer-801,2.0\n").unwrap();
        assert!(frame.rows()[0][0].is_nan());
        assert_eq!(frame.rows()[0][1], 2.0);
    }

    #[test]
    fn test_short_rows_skipped() {
        let frame = parse_csv("a,b\n1,2\n3\n4,5\n").unwrap();
        assert_eq!(frame.n_rows(), 2);
    }

    #[test]
    fn test_empty_input_rejected() {
        assert!(matches!(parse_csv("\n\n"), Err(DatasetError::Empty)));
    }

    #[test]
    fn test_quoted_fields() {
        let frame = parse_csv("\"a\",\"b\"\n\"1\",\"2\"\n").unwrap();
        assert_eq!(frame.column("b").unwrap(), vec![2.0]);
    }
}
