use std::sync::Arc;

use time::OffsetDateTime;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{
        dto::{LoginResponse, PublicUser, RegisteredUser},
        jwt::TokenManager,
        password::PasswordHasher,
        repo::UserRepository,
        repo_types::User,
    },
    errors::AppError,
};

pub struct AuthService {
    users: Arc<dyn UserRepository>,
    hasher: PasswordHasher,
    tokens: Arc<TokenManager>,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: PasswordHasher,
        tokens: Arc<TokenManager>,
    ) -> Self {
        Self {
            users,
            hasher,
            tokens,
        }
    }

    /// Username is checked before email, so a double collision reports
    /// `UsernameExists`. Both checks are advisory: two concurrent registrations
    /// can pass them and the store's unique index rejects the second insert.
    #[instrument(skip(self, email, password))]
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<RegisteredUser, AppError> {
        if self.users.find_user_by_username(username).await?.is_some() {
            warn!(%username, "username already registered");
            return Err(AppError::UsernameExists);
        }
        if self.users.find_user_by_email(email).await?.is_some() {
            warn!(%username, "email already registered");
            return Err(AppError::EmailExists);
        }

        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash: self.hasher.hash(password)?,
            created_at: OffsetDateTime::now_utc(),
        };
        self.users.create_user(&user).await?;

        info!(user_id = %user.id, %username, "user registered");
        Ok(RegisteredUser {
            id: user.id,
            username: user.username,
        })
    }

    /// Unknown username and wrong password both end in `InvalidCredentials`.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, AppError> {
        let Some(user) = self.users.find_user_by_username(username).await? else {
            warn!(%username, "login unknown username");
            return Err(AppError::InvalidCredentials);
        };

        if !self.hasher.verify(password, &user.password_hash)? {
            warn!(user_id = %user.id, "login invalid password");
            return Err(AppError::InvalidCredentials);
        }

        let access_token = self.tokens.generate_token(user.id, &user.username)?;
        info!(user_id = %user.id, "user logged in");
        Ok(LoginResponse {
            access_token,
            username: user.username,
        })
    }

    /// Trades a session token, expired or not, for a fresh one.
    #[instrument(skip_all)]
    pub fn refresh(&self, token: &str) -> Result<LoginResponse, AppError> {
        let access_token = self.tokens.refresh_token(token)?;
        let claims = self.tokens.validate(&access_token)?;
        info!(user_id = %claims.sub, "session refreshed");
        Ok(LoginResponse {
            access_token,
            username: claims.username,
        })
    }

    pub async fn current_user(&self, id: Uuid) -> Result<PublicUser, AppError> {
        let user = self
            .users
            .find_user_by_id(id)
            .await?
            .ok_or(AppError::UserNotFound)?;
        Ok(PublicUser {
            id: user.id,
            username: user.username,
            email: user.email,
        })
    }
}
