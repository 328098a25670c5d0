use std::sync::Arc;

use anyhow::Context;
use axum::extract::FromRef;
use sqlx::postgres::PgPoolOptions;

use crate::auth::{JwtKeys, UserUsecase};
use crate::config::{AppConfig, JwtConfig};
use crate::users::{InMemoryUserRepository, PgUserRepository, UserRepository};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<UserUsecase>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        if config.jwt.secret.is_empty() {
            tracing::warn!("SECRET is not set; log-in will fail to issue tokens");
        }

        let repo: Arc<dyn UserRepository> = match &config.database_url {
            Some(url) => {
                let db = PgPoolOptions::new()
                    .max_connections(10)
                    .connect(url)
                    .await
                    .context("connect to database")?;

                if let Err(e) = sqlx::migrate!("./migrations").run(&db).await {
                    tracing::warn!(error = %e, "migration failed; continuing");
                }
                Arc::new(PgUserRepository::new(db))
            }
            None => {
                tracing::warn!("DATABASE_URL is not set; users are kept in memory");
                Arc::new(InMemoryUserRepository::new())
            }
        };

        Ok(Self::from_parts(config, repo))
    }

    pub fn from_parts(config: Arc<AppConfig>, repo: Arc<dyn UserRepository>) -> Self {
        let keys = JwtKeys::from_config(&config.jwt);
        Self {
            users: Arc::new(UserUsecase::new(repo, keys)),
            config,
        }
    }

    /// In-memory state for tests.
    pub fn fake() -> Self {
        let config = Arc::new(AppConfig {
            database_url: None,
            jwt: JwtConfig {
                secret: "test".into(),
            },
            host: "127.0.0.1".into(),
            port: 0,
        });
        Self::from_parts(config, Arc::new(InMemoryUserRepository::new()))
    }
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        state.users.keys().clone()
    }
}
