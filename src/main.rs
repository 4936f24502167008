mod app;
mod auth;
mod categories;
mod config;
mod db;
mod errors;
mod extract;
mod posts;
mod response;
mod state;
#[cfg(test)]
mod test_support;
mod validation;

use crate::{config::AppConfig, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "blogg=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let config = AppConfig::from_env()?;
    if config.jwt.uses_default_secret() {
        tracing::warn!("JWT_SECRET is not set; using the development default secret");
    }

    let db = db::connect(&config).await?;
    db::migrate(&db).await;

    let state = AppState::with_postgres(config, db)?;
    let app = app::build_app(state.clone());
    app::serve(&state.config, app).await
}
