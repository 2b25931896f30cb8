use std::sync::Arc;

use sqlx::PgPool;

use crate::{config::AppConfig, db::build_pool};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db_pool: Option<PgPool>,
}

impl AppState {
    pub fn build(config: AppConfig) -> Result<Self, sqlx::Error> {
        let db_pool = build_pool(&config)?;
        Ok(Self {
            config: Arc::new(config),
            db_pool,
        })
    }

    #[cfg(test)]
    pub fn without_database(config: AppConfig) -> Self {
        Self {
            config: Arc::new(config),
            db_pool: None,
        }
    }
}
