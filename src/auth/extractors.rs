use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::warn;
use uuid::Uuid;

use crate::{auth::jwt::TokenManager, errors::AppError};

pub const AUTH_COOKIE: &str = "auth_token";

/// Identity taken from a validated session token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub username: String,
}

/// Raw session token from the `auth_token` cookie, or else from an
/// `Authorization: Bearer` header. Not validated.
#[derive(Debug, Clone)]
pub struct SessionToken(pub String);

fn token_from_parts(parts: &Parts) -> Result<String, AppError> {
    let jar = CookieJar::from_headers(&parts.headers);
    if let Some(cookie) = jar.get(AUTH_COOKIE).filter(|c| !c.value().is_empty()) {
        return Ok(cookie.value().to_string());
    }

    let header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::MissingToken)?;

    match header.split_once(' ') {
        Some(("Bearer", token)) if !token.is_empty() && !token.contains(' ') => {
            Ok(token.to_string())
        }
        _ => {
            warn!("malformed Authorization header");
            Err(AppError::MissingToken)
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for SessionToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        token_from_parts(parts).map(SessionToken)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Arc<TokenManager>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let tokens = Arc::<TokenManager>::from_ref(state);
        let token = token_from_parts(parts)?;
        let claims = tokens.validate(&token).map_err(|e| {
            warn!(error = %e, "rejected session token");
            AppError::from(e)
        })?;
        Ok(AuthUser {
            id: claims.sub,
            username: claims.username,
        })
    }
}
