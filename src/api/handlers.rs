//! Request handlers for the landing page, the prediction form and health.

use axum::extract::rejection::FormRejection;
use axum::extract::State;
use axum::response::Html;
use axum::{Form, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, warn};

use super::render::{self, FormMessage};
use crate::calibration;
use crate::config::{AppConfig, ArtifactsConfig, LimitsConfig};
use crate::prediction::{classify_reading, PredictPipeline};
use crate::storage::ArtifactStatus;
use crate::types::{SensorReading, CHANNELS, NUM_CHANNELS};

// ============================================================================
// State
// ============================================================================

/// Read-only state shared by every handler. Artifacts are re-read from disk
/// per request.
#[derive(Clone)]
pub struct WebState {
    pub artifacts: Arc<ArtifactsConfig>,
    pub limits: Arc<LimitsConfig>,
}

impl WebState {
    pub fn new(artifacts: ArtifactsConfig, limits: LimitsConfig) -> Self {
        Self {
            artifacts: Arc::new(artifacts),
            limits: Arc::new(limits),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.artifacts.clone(), config.limits.clone())
    }
}

// ============================================================================
// Pages
// ============================================================================

/// GET / - landing page
pub async fn index() -> Html<String> {
    Html(render::index_page())
}

/// GET /predictdata - empty form
pub async fn predict_form(State(state): State<WebState>) -> Html<String> {
    let labels = calibration::load_sensor_labels(&state.artifacts.calibration_path());
    Html(render::form_page(&labels, &[], None))
}

/// POST /predictdata - range check, then classify
///
/// Every failure is rendered inline on the form with status 200.
pub async fn predict_submit(
    State(state): State<WebState>,
    form: Result<Form<HashMap<String, String>>, FormRejection>,
) -> Html<String> {
    let labels = calibration::load_sensor_labels(&state.artifacts.calibration_path());

    let fields = match form {
        Ok(Form(fields)) => fields,
        Err(rejection) => {
            warn!(error = %rejection, "Rejected form submission");
            let message = FormMessage::Error(rejection.body_text());
            return Html(render::form_page(&labels, &[], Some(&message)));
        }
    };

    let entered: Vec<String> = CHANNELS
        .iter()
        .map(|c| fields.get(c.field).cloned().unwrap_or_default())
        .collect();

    let message = match parse_reading(&fields) {
        Err(e) => {
            warn!(error = %e, "Invalid form input");
            FormMessage::Error(e)
        }
        Ok(reading) => {
            info!(values = ?reading.values, "Prediction requested");
            let task_state = state.clone();
            let outcome = tokio::task::spawn_blocking(move || {
                let pipeline = PredictPipeline::new(&task_state.artifacts);
                classify_reading(&reading, &task_state.limits, &pipeline)
            })
            .await;

            match outcome {
                Ok(Ok(outcome)) => FormMessage::Result(outcome.message().to_string()),
                Ok(Err(e)) => {
                    error!(error = %e, "Error during prediction");
                    FormMessage::Error(e.to_string())
                }
                Err(e) => {
                    error!(error = %e, "Prediction task failed");
                    FormMessage::Error(format!("prediction task failed: {e}"))
                }
            }
        }
    };

    Html(render::form_page(&labels, &entered, Some(&message)))
}

/// Parse `sensor_1` .. `sensor_10` into a reading.
pub fn parse_reading(fields: &HashMap<String, String>) -> Result<SensorReading, String> {
    let mut values = [0.0; NUM_CHANNELS];
    for (slot, channel) in values.iter_mut().zip(CHANNELS.iter()) {
        let name = channel.field;
        let raw = fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| format!("missing value for {name}"))?;
        *slot = raw
            .parse::<f64>()
            .map_err(|_| format!("could not convert '{raw}' to a number for {name}"))?;
    }
    Ok(SensorReading::new(values))
}

// ============================================================================
// Health
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "ok" when preprocessor and model are both present, else "degraded"
    pub status: &'static str,
    pub model_ready: bool,
    pub artifacts: Vec<ArtifactStatus>,
    pub timestamp: DateTime<Utc>,
}

/// GET /health - artifact presence report
pub async fn health(State(state): State<WebState>) -> Json<HealthResponse> {
    let a = &state.artifacts;
    let artifacts = vec![
        ArtifactStatus::probe("calibration", &a.calibration_path()),
        ArtifactStatus::probe("preprocessor", &a.preprocessor_path()),
        ArtifactStatus::probe("model", &a.model_path()),
    ];
    let model_ready = artifacts[1].present && artifacts[2].present;

    Json(HealthResponse {
        status: if model_ready { "ok" } else { "degraded" },
        model_ready,
        artifacts,
        timestamp: Utc::now(),
    })
}
