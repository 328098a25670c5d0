use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

/// Failures reported by a [`crate::users::UserRepository`].
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("user not found")]
    NotFound,
    #[error("email already registered")]
    DuplicateEmail,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Why a password could not be hashed or checked.
#[derive(Debug, Error)]
pub enum HashFailure {
    #[error("password must not be empty")]
    EmptyPassword,
    #[error("{0}")]
    Algorithm(String),
}

/// Errors surfaced by the credential use case.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("password hashing failed: {0}")]
    Hashing(#[source] HashFailure),
    #[error("persistence failed: {0}")]
    Persistence(#[source] RepoError),
    #[error("user not found")]
    UserNotFound,
    #[error("credentials do not match")]
    CredentialMismatch,
    #[error("token signing failed: {0}")]
    Signing(String),
    #[error("invalid or expired token")]
    InvalidToken,
}

impl From<RepoError> for AuthError {
    fn from(inner: RepoError) -> Self {
        match inner {
            RepoError::NotFound => AuthError::UserNotFound,
            other => AuthError::Persistence(other),
        }
    }
}

impl AuthError {
    pub(crate) fn algorithm(err: impl std::fmt::Display) -> Self {
        AuthError::Hashing(HashFailure::Algorithm(err.to_string()))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::Hashing(HashFailure::EmptyPassword) => StatusCode::BAD_REQUEST,
            AuthError::Persistence(RepoError::DuplicateEmail) => StatusCode::CONFLICT,
            AuthError::UserNotFound | AuthError::CredentialMismatch | AuthError::InvalidToken => {
                StatusCode::UNAUTHORIZED
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message. Unknown email and wrong password read the same.
    pub(crate) fn public_message(&self) -> &'static str {
        match self {
            AuthError::Hashing(HashFailure::EmptyPassword) => "Password must not be empty",
            AuthError::Hashing(HashFailure::Algorithm(_)) => "Password hashing error",
            AuthError::Persistence(RepoError::DuplicateEmail) => "Email already registered",
            AuthError::Persistence(_) => "Database error",
            AuthError::UserNotFound | AuthError::CredentialMismatch => "Invalid credentials",
            AuthError::Signing(_) => "Token error",
            AuthError::InvalidToken => "Invalid or expired token",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "auth request failed");
        } else {
            warn!(error = %self, "auth request rejected");
        }
        let body = Json(json!({ "error": self.public_message() }));
        (status, body).into_response()
    }
}

/// Handler error: request validation failures plus anything from the use case.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid email")]
    InvalidEmail,
    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::InvalidEmail => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Invalid email" })),
            )
                .into_response(),
            ApiError::Auth(e) => e.into_response(),
        }
    }
}
