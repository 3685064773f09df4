use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::{Display, From};
use serde_json::json;

use crate::availability::error::AvailabilityError;
use crate::model::constraints::ConstraintError;

#[derive(Debug, Display, From)]
pub enum AppError {
    #[display(fmt = "{}", _0)]
    Availability(AvailabilityError),
    #[display(fmt = "{}", _0)]
    Constraint(ConstraintError),
    #[display(fmt = "session '{}' not found", _0)]
    #[from(ignore)]
    SessionNotFound(String),
    #[display(fmt = "{}", _0)]
    #[from(ignore)]
    BadRequest(String),
    #[display(fmt = "export failed: {:#}", _0)]
    Export(anyhow::Error),
}

impl std::error::Error for AppError {}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Availability(e) => match e {
                AvailabilityError::UnknownCellKey { .. } | AvailabilityError::UnknownEmployee(_) => {
                    StatusCode::NOT_FOUND
                }
                AvailabilityError::InvalidDisplayValue(_) | AvailabilityError::ShapeMismatch(_) => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                _ => StatusCode::BAD_REQUEST,
            },
            AppError::Constraint(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }
        HttpResponse::build(status).json(json!({ "error": self.to_string() }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crate::model::work_state::Segment;

    #[test]
    fn maps_errors_to_status_codes() {
        let unknown = AppError::from(AvailabilityError::UnknownCellKey {
            employee: "E9".to_string(),
            day: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            segment: Segment::WholeDay,
        });
        assert_eq!(unknown.status_code(), StatusCode::NOT_FOUND);

        let invalid = AppError::from(AvailabilityError::InvalidDisplayValue("?".to_string()));
        assert_eq!(invalid.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

        assert_eq!(
            AppError::from(AvailabilityError::EmptyRoster).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Export(anyhow::anyhow!("disk full")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::SessionNotFound("x".to_string()).to_string(),
            "session 'x' not found"
        );
    }
}
