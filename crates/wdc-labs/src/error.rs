use crate::config::ConfigError;
use crate::sponsorship::SponsorshipError;
use crate::telemetry::TelemetryError;
use crate::waitlist::{ControllerError, StoreWriteError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Store(StoreWriteError),
    Controller(ControllerError),
    Sponsorship(SponsorshipError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Store(err) => write!(f, "store error: {}", err),
            AppError::Controller(err) => write!(f, "application error: {}", err),
            AppError::Sponsorship(err) => write!(f, "sponsorship error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Store(err) => Some(err),
            AppError::Controller(err) => Some(err),
            AppError::Sponsorship(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Sponsorship(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Store(StoreWriteError::Duplicate) => StatusCode::CONFLICT,
            AppError::Store(_) => StatusCode::BAD_GATEWAY,
            AppError::Controller(ControllerError::Locked { .. }) => StatusCode::CONFLICT,
            AppError::Controller(ControllerError::UnknownField(_)) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<StoreWriteError> for AppError {
    fn from(value: StoreWriteError) -> Self {
        Self::Store(value)
    }
}

impl From<ControllerError> for AppError {
    fn from(value: ControllerError) -> Self {
        Self::Controller(value)
    }
}

impl From<SponsorshipError> for AppError {
    fn from(value: SponsorshipError) -> Self {
        Self::Sponsorship(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::waitlist::SubmissionPhase;

    #[test]
    fn controller_errors_map_to_client_statuses() {
        let locked = AppError::from(ControllerError::Locked {
            phase: SubmissionPhase::Submitting,
        });
        assert!(locked.to_string().starts_with("application error:"));
        assert_eq!(locked.into_response().status(), StatusCode::CONFLICT);

        let unknown = AppError::from(ControllerError::UnknownField("age".into()));
        assert_eq!(
            unknown.into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn duplicate_store_rows_are_conflicts() {
        let response = AppError::from(StoreWriteError::Duplicate).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
