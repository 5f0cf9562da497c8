//! Config validation: unknown-key detection with Levenshtein suggestions,
//! grid sanity checks and plausibility-range checks.
//!
//! Unknown keys only produce warnings so older config files keep working.

use std::collections::HashSet;

use super::{GridConfig, LimitsConfig};
use crate::types::NUM_CHANNELS;
use crate::models::Criterion;

/// A non-fatal config warning (typo, suspicious value).
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, " (did you mean '{s}'?)")?;
        }
        Ok(())
    }
}

// ============================================================================
// Known Config Keys
// ============================================================================

/// Returns the complete set of valid dotted key paths for `AppConfig`.
///
/// Maintained by hand to match the struct hierarchy in `app_config.rs`.
pub fn known_config_keys() -> HashSet<&'static str> {
    let keys: &[&str] = &[
        "artifacts",
        "artifacts.dir",
        "artifacts.calibration_file",
        "artifacts.preprocessor_file",
        "artifacts.model_file",
        "artifacts.raw_data_file",
        "artifacts.train_file",
        "artifacts.test_file",
        "ingestion",
        "ingestion.source",
        "ingestion.test_ratio",
        "ingestion.seed",
        "features",
        "features.target_column",
        "features.drop_columns",
        "preprocessing",
        "preprocessing.knn_neighbors",
        "training",
        "training.cv_folds",
        "training.min_accuracy",
        "training.seed",
        "training.grids",
        "training.grids.decision_tree",
        "training.grids.decision_tree.criterion",
        "training.grids.random_forest",
        "training.grids.random_forest.n_estimators",
        "training.grids.random_forest.criterion",
        "training.grids.gradient_boosting",
        "training.grids.gradient_boosting.learning_rate",
        "training.grids.gradient_boosting.n_estimators",
        "training.grids.logistic_regression",
        "training.grids.logistic_regression.c",
        "training.grids.logistic_regression.max_iter",
        "training.grids.adaboost",
        "training.grids.adaboost.learning_rate",
        "training.grids.adaboost.n_estimators",
        "training.grids.k_neighbors",
        "training.grids.k_neighbors.n_neighbors",
        "limits",
        "limits.ranges",
        "server",
        "server.addr",
        "logging",
        "logging.dir",
        "logging.file_logging",
    ];
    keys.iter().copied().collect()
}

/// Recursively collect dotted key paths from a TOML value.
///
/// Arrays of tables (`[[limits.ranges]]`) are not descended into.
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    if let Some(table) = value.as_table() {
        for (k, v) in table {
            let path = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{prefix}.{k}")
            };
            keys.push(path.clone());
            if v.is_table() {
                keys.extend(walk_toml_keys(v, &path));
            }
        }
    }
    keys
}

// ============================================================================
// Levenshtein Distance
// ============================================================================

/// Compute the Levenshtein edit distance between two strings.
fn levenshtein(a: &str, b: &str) -> usize {
    let b_len = b.chars().count();
    if a.is_empty() {
        return b_len;
    }
    if b_len == 0 {
        return a.chars().count();
    }

    let mut prev: Vec<usize> = (0..=b_len).collect();
    let mut curr = vec![0; b_len + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.chars().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_len]
}

/// Suggest the closest known key for an unknown key, if within edit distance 3.
pub fn suggest_correction(unknown: &str, known: &HashSet<&str>) -> Option<String> {
    known
        .iter()
        .map(|k| (*k, levenshtein(unknown, k)))
        .filter(|(_, d)| *d <= 3)
        .min_by(|(ka, da), (kb, db)| da.cmp(db).then_with(|| ka.cmp(kb)))
        .map(|(k, _)| k.to_string())
}

/// Parse a raw TOML string and return warnings for any unknown config keys.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let value: toml::Value = match raw_toml.parse() {
        Ok(v) => v,
        Err(_) => return Vec::new(), // parse errors are reported by serde
    };

    let known = known_config_keys();
    walk_toml_keys(&value, "")
        .into_iter()
        .filter(|key| !known.contains(key.as_str()))
        .map(|key| ValidationWarning {
            suggestion: suggest_correction(&key, &known),
            message: format!("Unknown config key '{key}'"),
            field: key,
        })
        .collect()
}

// ============================================================================
// Value Checks
// ============================================================================

/// Every grid needs at least one candidate and only positive, finite values.
pub fn validate_grids(grids: &GridConfig) -> Vec<String> {
    let mut errors = Vec::new();

    if grids.decision_tree.criterion.is_empty() {
        errors.push("training.grids.decision_tree.criterion must not be empty".to_string());
    }
    check_counts(&grids.random_forest.n_estimators, "random_forest.n_estimators", &mut errors);
    if grids.random_forest.criterion.is_empty() {
        errors.push("training.grids.random_forest.criterion must not be empty".to_string());
    }
    check_classification_criteria(&grids.decision_tree.criterion, "decision_tree.criterion", &mut errors);
    check_classification_criteria(&grids.random_forest.criterion, "random_forest.criterion", &mut errors);
    check_counts(&grids.gradient_boosting.n_estimators, "gradient_boosting.n_estimators", &mut errors);
    check_positive(&grids.gradient_boosting.learning_rate, "gradient_boosting.learning_rate", &mut errors);
    check_counts(&grids.adaboost.n_estimators, "adaboost.n_estimators", &mut errors);
    check_positive(&grids.adaboost.learning_rate, "adaboost.learning_rate", &mut errors);
    check_positive(&grids.logistic_regression.c, "logistic_regression.c", &mut errors);
    check_counts(&grids.logistic_regression.max_iter, "logistic_regression.max_iter", &mut errors);
    check_counts(&grids.k_neighbors.n_neighbors, "k_neighbors.n_neighbors", &mut errors);

    errors
}

fn check_classification_criteria(values: &[Criterion], name: &str, errors: &mut Vec<String>) {
    if values.contains(&Criterion::SquaredError) {
        errors.push(format!("training.grids.{name}: squared_error is not a classification criterion"));
    }
}

fn check_counts(values: &[usize], name: &str, errors: &mut Vec<String>) {
    if values.is_empty() {
        errors.push(format!("training.grids.{name} must not be empty"));
    } else if values.contains(&0) {
        errors.push(format!("training.grids.{name} values must be > 0"));
    }
}

fn check_positive(values: &[f64], name: &str, errors: &mut Vec<String>) {
    if values.is_empty() {
        errors.push(format!("training.grids.{name} must not be empty"));
    } else if values.iter().any(|v| !v.is_finite() || *v <= 0.0) {
        errors.push(format!("training.grids.{name} values must be finite and > 0"));
    }
}

/// One finite, non-inverted range per channel.
pub fn validate_limits(limits: &LimitsConfig) -> Vec<String> {
    let mut errors = Vec::new();
    if limits.ranges.len() != NUM_CHANNELS {
        errors.push(format!(
            "limits.ranges must have {NUM_CHANNELS} entries, got {}",
            limits.ranges.len()
        ));
    }
    for (i, r) in limits.ranges.iter().enumerate() {
        if !r.min.is_finite() || !r.max.is_finite() {
            errors.push(format!("limits.ranges[{i}]: bounds must be finite"));
        } else if r.min > r.max {
            errors.push(format!(
                "limits.ranges[{i}]: min ({}) must be <= max ({})",
                r.min, r.max
            ));
        }
    }
    errors
}
