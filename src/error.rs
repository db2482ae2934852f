use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use sea_orm::DbErr;
use serde_json::json;
use thiserror::Error;

/// Failure taxonomy for all service operations. Each variant maps to a
/// single HTTP status; none is fatal to the process.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed or out-of-range input (content too long, password
    /// confirmation mismatch, bad field lengths).
    #[error("validation error: {0}")]
    Validation(String),

    /// Duplicate follow/like/account.
    #[error("{0} already exists")]
    AlreadyExists(&'static str),

    /// Missing edge, tweet, comment or user.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Actor lacks ownership of the resource, or the account may not act.
    #[error("forbidden: {0}")]
    Forbidden(&'static str),

    /// Operation is never legal regardless of state (e.g. self-follow).
    #[error("invalid operation: {0}")]
    InvalidOperation(&'static str),

    /// Storage-layer failure.
    #[error("database error: {0}")]
    Database(#[from] DbErr),

    /// Non-storage infrastructure failure (e.g. password hashing).
    #[error("internal service error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Translates a failed edge insert into the domain taxonomy: a
    /// unique-key violation means a concurrent request won the race to
    /// create the same edge.
    pub fn from_insert(err: DbErr, entity: &'static str) -> Self {
        let msg = err.to_string();
        if msg.contains("unique") || msg.contains("UNIQUE") || msg.contains("Duplicate") {
            Error::AlreadyExists(entity)
        } else {
            Error::Database(err)
        }
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::AlreadyExists(_) => StatusCode::CONFLICT,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Forbidden(_) => StatusCode::FORBIDDEN,
            Error::InvalidOperation(_) => StatusCode::BAD_REQUEST,
            Error::Database(_) | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if matches!(self, Error::Database(_) | Error::Internal(_)) {
            log::error!("Internal error: {}", self);
            return HttpResponse::InternalServerError().json(json!({
                "error": "internal server error"
            }));
        }
        HttpResponse::build(self.status_code()).json(json!({
            "error": self.to_string()
        }))
    }
}
