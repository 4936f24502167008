use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, warn};

use crate::{
    auth::{jwt::TokenError, password::HashingError},
    response::failure,
    validation::FieldError,
};

/// Every failure a handler can report. Business variants carry a stable code;
/// infrastructure causes are kept opaque to callers.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation failed")]
    Validation(Vec<FieldError>),
    #[error("{0}")]
    BadRequest(String),

    #[error("username already exists")]
    UsernameExists,
    #[error("email already exists")]
    EmailExists,
    #[error("slug already exists")]
    SlugExists,
    #[error("category slug already exists")]
    CategorySlugExists,

    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("missing authentication token")]
    MissingToken,
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error("not authorized to perform this action")]
    Unauthorized,

    #[error("post not found")]
    PostNotFound,
    #[error("category not found")]
    CategoryNotFound,
    #[error("user not found")]
    UserNotFound,

    #[error(transparent)]
    Hashing(#[from] HashingError),
    #[error(transparent)]
    Infrastructure(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::UsernameExists | Self::EmailExists | Self::SlugExists | Self::CategorySlugExists => {
                StatusCode::CONFLICT
            }
            Self::InvalidCredentials | Self::MissingToken => StatusCode::UNAUTHORIZED,
            Self::Token(TokenError::Invalid | TokenError::Expired) => StatusCode::UNAUTHORIZED,
            Self::Unauthorized => StatusCode::FORBIDDEN,
            Self::PostNotFound | Self::CategoryNotFound | Self::UserNotFound => StatusCode::NOT_FOUND,
            Self::Token(TokenError::Signing(_)) | Self::Hashing(_) | Self::Infrastructure(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::UsernameExists => "USERNAME_EXISTS",
            Self::EmailExists => "EMAIL_EXISTS",
            Self::SlugExists => "SLUG_EXISTS",
            Self::CategorySlugExists => "CATEGORY_SLUG_EXISTS",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::MissingToken => "UNAUTHENTICATED",
            Self::Token(TokenError::Invalid) => "INVALID_TOKEN",
            Self::Token(TokenError::Expired) => "EXPIRED_TOKEN",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::PostNotFound => "POST_NOT_FOUND",
            Self::CategoryNotFound => "CATEGORY_NOT_FOUND",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::Token(TokenError::Signing(_)) | Self::Hashing(_) | Self::Infrastructure(_) => {
                "INTERNAL_ERROR"
            }
        }
    }

    /// Caller-facing message. Internal failures never leak their cause.
    fn public_message(&self) -> String {
        match self {
            Self::Validation(_) => "Validation failed".into(),
            Self::BadRequest(msg) => msg.clone(),
            Self::UsernameExists => "Username already exists".into(),
            Self::EmailExists => "Email already exists".into(),
            Self::SlugExists => "Slug already exists".into(),
            Self::CategorySlugExists => "Category slug already exists".into(),
            Self::InvalidCredentials => "Invalid username or password".into(),
            Self::MissingToken => "Missing authentication token".into(),
            Self::Token(TokenError::Invalid) => "Invalid token".into(),
            Self::Token(TokenError::Expired) => "Token has expired".into(),
            Self::Unauthorized => "You are not authorized to perform this action".into(),
            Self::PostNotFound => "Post not found".into(),
            Self::CategoryNotFound => "Category not found".into(),
            Self::UserNotFound => "User not found".into(),
            Self::Token(TokenError::Signing(_)) | Self::Hashing(_) | Self::Infrastructure(_) => {
                "Internal server error".into()
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        warn!(error = %rejection.body_text(), "rejected request body");
        Self::BadRequest("Invalid JSON format".into())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        warn!(error = %rejection.body_text(), "rejected query string");
        Self::BadRequest("Invalid query parameters".into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = ?self, "request failed");
        }
        let details = match &self {
            Self::Validation(fields) => serde_json::to_value(fields).ok(),
            _ => None,
        };
        failure(status, self.public_message(), self.code(), details)
    }
}
