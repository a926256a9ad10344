//! Maps [`ScrapeError`] onto HTTP status codes and a stable JSON error body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use mediascout_types::errors::ScrapeError;
use serde_json::json;

pub struct ApiError(pub ScrapeError);

impl From<ScrapeError> for ApiError {
    fn from(err: ScrapeError) -> Self {
        Self(err)
    }
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match &self.0 {
            ScrapeError::Locked { .. } => StatusCode::CONFLICT,
            ScrapeError::BrandNotFound { .. } => StatusCode::NOT_FOUND,
            ScrapeError::ConfigError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ScrapeError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            ScrapeError::StoreError { .. } => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_type = self.0.error_type_label();
        let message = self.0.to_string();

        match status {
            StatusCode::INTERNAL_SERVER_ERROR | StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT => {
                tracing::error!(error_type, message = %message, "scrape request failed");
            }
            _ => {
                tracing::warn!(error_type, message = %message, "scrape request rejected");
            }
        }

        let mut body = json!({
            "error": {
                "type": error_type,
                "message": message,
                "status": status.as_u16(),
            }
        });

        if let ScrapeError::Locked { started_at, .. } = &self.0 {
            body["error"]["started_at"] = json!(started_at.to_rfc3339());
        }

        (status, Json(body)).into_response()
    }
}
