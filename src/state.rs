use std::sync::Arc;

use sqlx::PgPool;

use crate::{
    auth::{
        jwt::TokenManager,
        password::PasswordHasher,
        repo::{PgUserRepository, UserRepository},
        services::AuthService,
    },
    categories::{
        repo::{CategoryRepository, PgCategoryRepository},
        services::CategoryService,
    },
    config::AppConfig,
    posts::{
        repo::{PgPostRepository, PostRepository},
        services::PostService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub tokens: Arc<TokenManager>,
    pub auth: Arc<AuthService>,
    pub posts: Arc<PostService>,
    pub categories: Arc<CategoryService>,
}

impl AppState {
    pub fn with_postgres(config: AppConfig, db: PgPool) -> anyhow::Result<Self> {
        Self::from_parts(
            config,
            Arc::new(PgUserRepository::new(db.clone())),
            Arc::new(PgPostRepository::new(db.clone())),
            Arc::new(PgCategoryRepository::new(db)),
        )
    }

    /// Wires services over any repository implementations.
    pub fn from_parts(
        config: AppConfig,
        users: Arc<dyn UserRepository>,
        posts: Arc<dyn PostRepository>,
        categories: Arc<dyn CategoryRepository>,
    ) -> anyhow::Result<Self> {
        let hasher = PasswordHasher::new(&config.hasher)?;
        let tokens = Arc::new(TokenManager::new(&config.jwt));

        Ok(Self {
            tokens: tokens.clone(),
            auth: Arc::new(AuthService::new(users, hasher, tokens)),
            posts: Arc::new(PostService::new(posts, categories.clone())),
            categories: Arc::new(CategoryService::new(categories)),
            config: Arc::new(config),
        })
    }
}
