use axum::{routing::get, Router};

use crate::state::AppState;

pub mod dashboard;
pub mod health;

pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .merge(dashboard::router())
}
