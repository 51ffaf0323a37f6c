//! Classification endpoint

use axum::{
    body::Bytes,
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::catalog::Locale;
use crate::pipeline::Diagnosis;
use crate::server::error::ApiError;
use crate::server::state::SharedState;
use crate::utils::error::PlantDocError;

#[derive(Debug, Default, Deserialize)]
pub struct ClassifyQuery {
    /// Locale code or native name; the configured default when absent
    pub locale: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ClassifyResponse {
    pub request_id: String,
    #[serde(flatten)]
    pub diagnosis: Diagnosis,
}

/// POST /classify?locale=xx - Classify the raw image in the request body
pub async fn classify(
    State(state): State<SharedState>,
    Query(query): Query<ClassifyQuery>,
    body: Bytes,
) -> Result<Json<ClassifyResponse>, ApiError> {
    let request_id = Uuid::new_v4().to_string();

    let locale = match query.locale.as_deref() {
        Some(code) => code.parse::<Locale>()?,
        None => state.default_locale,
    };

    let diagnoser = state.diagnoser.clone();
    let task = tokio::task::spawn_blocking(move || diagnoser.classify(&body, locale));

    let joined = match state.inference_timeout {
        Some(limit) => tokio::time::timeout(limit, task).await.map_err(|_| {
            PlantDocError::Inference(format!(
                "inference did not finish within {}ms",
                limit.as_millis()
            ))
        })?,
        None => task.await,
    };

    let diagnosis = joined
        .map_err(|e| PlantDocError::Inference(format!("inference task failed: {}", e)))??;

    info!(
        request_id = %request_id,
        locale = locale.code(),
        label = diagnosis.label().map(|l| l.as_str()).unwrap_or("-"),
        "Classified image in {:.1}ms",
        diagnosis.inference_time_ms
    );

    Ok(Json(ClassifyResponse {
        request_id,
        diagnosis,
    }))
}
