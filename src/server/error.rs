//! Mapping from `PlantDocError` to HTTP responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{error, warn};

use crate::utils::error::PlantDocError;

/// JSON error body: `{ "error": kind, "message": text }`
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

/// Handler error wrapper
#[derive(Debug)]
pub struct ApiError(pub PlantDocError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            PlantDocError::UnsupportedLocale(_) => StatusCode::BAD_REQUEST,
            PlantDocError::InvalidImage(_) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<PlantDocError> for ApiError {
    fn from(err: PlantDocError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self.0 {
            // Model and labels out of step; every request will fail the same way
            PlantDocError::InvalidProbabilityVector { .. } => error!("Request failed: {}", self.0),
            _ => warn!("Request failed ({}): {}", status.as_u16(), self.0),
        }

        let body = ErrorBody {
            error: self.0.kind(),
            message: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (PlantDocError::UnsupportedLocale("fr".into()), 400),
            (PlantDocError::InvalidImage("truncated".into()), 422),
            (PlantDocError::Inference("timeout".into()), 500),
            (
                PlantDocError::InvalidProbabilityVector {
                    expected: 8,
                    actual: 3,
                },
                500,
            ),
        ];
        for (err, code) in cases {
            assert_eq!(ApiError(err).status().as_u16(), code);
        }
    }

    #[test]
    fn test_response_status() {
        let response = ApiError(PlantDocError::InvalidImage("bad".into())).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
