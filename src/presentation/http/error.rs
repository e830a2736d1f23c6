use poem::http::StatusCode;

use crate::domain::errors::DomainError;

/// Translate usecase failures into HTTP statuses.
pub fn map_domain_error(err: anyhow::Error) -> poem::Error {
    let status = match err.downcast_ref::<DomainError>() {
        Some(DomainError::NotFound(_)) => StatusCode::NOT_FOUND,
        Some(DomainError::AlreadyExists(_)) => StatusCode::CONFLICT,
        Some(DomainError::Validation(_)) => StatusCode::BAD_REQUEST,
        Some(DomainError::Forbidden(_)) => StatusCode::FORBIDDEN,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    poem::Error::from_string(err.to_string(), status)
}
