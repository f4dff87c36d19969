use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;

use crate::auth::AuthError;
use crate::domain::company::CompanyError;

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

fn error_body(status: StatusCode, message: &str) -> HttpResponse {
    HttpResponse::build(status).json(ErrorBody { error: message })
}

pub(super) async fn route_not_found() -> HttpResponse {
    error_body(StatusCode::NOT_FOUND, "route not found")
}

pub(super) async fn method_not_allowed() -> HttpResponse {
    error_body(StatusCode::METHOD_NOT_ALLOWED, "method not allowed")
}

impl ResponseError for CompanyError {
    fn status_code(&self) -> StatusCode {
        match self {
            CompanyError::MalformedInput(_)
            | CompanyError::InvalidIdentifier(_)
            | CompanyError::ValidationFailed(_) => StatusCode::BAD_REQUEST,
            CompanyError::Conflict(_) | CompanyError::ConflictingChange => StatusCode::CONFLICT,
            CompanyError::NotFound(_) => StatusCode::NOT_FOUND,
            CompanyError::PersistenceFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // PersistenceFailed only names the operation; the store error is logged.
        error_body(self.status_code(), &self.to_string())
    }
}

impl ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MalformedInput(_) => StatusCode::BAD_REQUEST,
            AuthError::InvalidCredentials | AuthError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AuthError::Backend(_) | AuthError::Hashing(_) | AuthError::TokenIssue(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AuthError::Hashing(_) => "could not verify credentials".to_string(),
            other => other.to_string(),
        };
        error_body(self.status_code(), &message)
    }
}
