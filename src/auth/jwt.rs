use std::{sync::Arc, time::Duration};

use axum::extract::FromRef;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;
use tracing::debug;
use uuid::Uuid;

use crate::{config::JwtConfig, state::AppState};

#[derive(Debug, Error)]
pub enum TokenError {
    /// Bad signature, unexpected algorithm, unparsable or not-yet-valid payload.
    #[error("invalid token")]
    Invalid,
    /// Signature and structure are fine but `exp` has passed.
    #[error("token has expired")]
    Expired,
    #[error("token signing failed: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

/// JWT payload carried by every session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,        // user ID
    pub username: String,
    pub iat: i64,         // issued at (unix timestamp)
    pub nbf: i64,         // not before, equal to iat
    pub exp: i64,         // expires at
}

/// Issues and checks HMAC-signed session tokens. There is no revocation list:
/// a token stays valid until `exp` even after logout.
#[derive(Clone)]
pub struct TokenManager {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

/// Lifetime in whole seconds, saturating at `i64::MAX`.
pub fn ttl_secs(ttl: Duration) -> i64 {
    i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX)
}

impl FromRef<AppState> for Arc<TokenManager> {
    fn from_ref(state: &AppState) -> Self {
        state.tokens.clone()
    }
}

impl TokenManager {
    pub fn new(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            ttl: cfg.ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn generate_token(&self, user_id: Uuid, username: &str) -> Result<String, TokenError> {
        self.issue(user_id, username, OffsetDateTime::now_utc())
    }

    /// Signs a token as if issued at `issued_at`.
    #[cfg(test)]
    pub(crate) fn issue_at(
        &self,
        user_id: Uuid,
        username: &str,
        issued_at: OffsetDateTime,
    ) -> Result<String, TokenError> {
        self.issue(user_id, username, issued_at)
    }

    fn issue(
        &self,
        user_id: Uuid,
        username: &str,
        issued_at: OffsetDateTime,
    ) -> Result<String, TokenError> {
        let iat = issued_at.unix_timestamp();
        let claims = Claims {
            sub: user_id,
            username: username.to_string(),
            iat,
            nbf: iat,
            exp: iat.saturating_add(ttl_secs(self.ttl)),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(TokenError::Signing)?;
        debug!(user_id = %user_id, "jwt signed");
        Ok(token)
    }

    fn validation(check_exp: bool) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
        validation.leeway = 0;
        validation.validate_nbf = true;
        validation.validate_exp = check_exp;
        validation.set_required_spec_claims(&["exp", "nbf", "iat"]);
        validation
    }

    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        self.decode_with(token, &Self::validation(true))
    }

    fn decode_with(&self, token: &str, validation: &Validation) -> Result<Claims, TokenError> {
        match decode::<Claims>(token, &self.decoding, validation) {
            Ok(data) => {
                debug!(user_id = %data.claims.sub, "jwt verified");
                Ok(data.claims)
            }
            Err(e) => match e.kind() {
                ErrorKind::ExpiredSignature => Err(TokenError::Expired),
                _ => Err(TokenError::Invalid),
            },
        }
    }

    /// Exchanges a token for a fresh one. Expired tokens are accepted on purpose
    /// so a client can renew without logging in again; any other failure is fatal.
    pub fn refresh_token(&self, token: &str) -> Result<String, TokenError> {
        let claims = match self.validate(token) {
            Ok(claims) => claims,
            Err(TokenError::Expired) => self.decode_with(token, &Self::validation(false))?,
            Err(e) => return Err(e),
        };
        self.generate_token(claims.sub, &claims.username)
    }
}

#[cfg(test)]
pub(crate) fn test_tokens() -> TokenManager {
    TokenManager::new(&JwtConfig {
        secret: "test-secret".into(),
        ttl: Duration::from_secs(5 * 60),
    })
}
