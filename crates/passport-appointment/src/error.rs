use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::appointment::directory::DirectoryError;
use crate::workflows::appointment::router::error_response;
use crate::workflows::appointment::service::AppointmentServiceError;

/// Failure surfaced by the binaries: startup, serving, or a booking operation driven from the CLI.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("server error: {0}")]
    Server(#[from] axum::Error),
    #[error("office directory error: {0}")]
    Directory(#[from] DirectoryError),
    #[error("booking error: {0}")]
    Booking(#[from] AppointmentServiceError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Booking(error) => return error_response(error),
            AppError::Directory(DirectoryError::Csv(_) | DirectoryError::MissingValue { .. }) => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
