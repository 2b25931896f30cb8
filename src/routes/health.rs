use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde_json::{json, Value};
use std::time::Duration;

use crate::state::AppState;

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    let db_ok = match &state.db_pool {
        Some(pool) => {
            // Bounded so the probe answers even when the first connection hangs.
            match tokio::time::timeout(
                Duration::from_secs(3),
                sqlx::query("SELECT 1").fetch_one(pool),
            )
            .await
            {
                Ok(Ok(_)) => true,
                Ok(Err(error)) => {
                    tracing::error!(error = %error, "Health check DB query failed");
                    false
                }
                Err(_) => {
                    tracing::error!("Health check DB query timed out (3s)");
                    false
                }
            }
        }
        None => false,
    };

    let status = if db_ok || state.db_pool.is_none() {
        "ok"
    } else {
        "degraded"
    };
    Json(json!({
        "status": status,
        "app": state.config.app_name,
        "now": Utc::now().to_rfc3339(),
        "db": db_ok,
    }))
}

#[cfg(test)]
mod tests {
    use super::health;
    use crate::{config::AppConfig, state::AppState};
    use axum::extract::State;

    #[tokio::test]
    async fn reports_ok_without_database() {
        let state = AppState::without_database(AppConfig::default());
        let body = health(State(state)).await.0;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["db"], false);
        assert_eq!(body["app"], "Venue Dashboard API");
    }
}
