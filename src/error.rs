use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::config::ANON_ANALYSIS_LIMIT;

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Free analysis limit reached")]
    QuotaExceeded { analyses_used: u32 },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Upstream fetch failed: {0}")]
    Upstream(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for AnalysisError {
    fn into_response(self) -> Response {
        // The quota body keeps the exact field casing the dashboard expects.
        if let AnalysisError::QuotaExceeded { analyses_used } = &self {
            let body = serde_json::json!({
                "error": self.to_string(),
                "upgradeRequired": true,
                "analyses_used": analyses_used,
                "analyses_limit": ANON_ANALYSIS_LIMIT,
            });
            return (StatusCode::TOO_MANY_REQUESTS, axum::Json(body)).into_response();
        }

        let status = match &self {
            AnalysisError::Validation(_) => StatusCode::BAD_REQUEST,
            AnalysisError::NotFound(_) => StatusCode::NOT_FOUND,
            AnalysisError::QuotaExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            AnalysisError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AnalysisError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AnalysisError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = serde_json::json!({
            "error": self.to_string(),
        });

        (status, axum::Json(body)).into_response()
    }
}
