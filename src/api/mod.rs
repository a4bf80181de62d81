pub mod handlers;

pub use handlers::{health_check, solve, solve_fast, SolveRequest, SolveResponse};

use crate::config::SearchConfig;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// 构建路由
pub fn router(settings: Arc<SearchConfig>) -> Router {
    let solve_routes = Router::new()
        .route("/api/solve", post(solve))
        .route("/api/solve/fast", post(solve_fast))
        .with_state(settings);

    Router::new()
        .route("/health", get(health_check))
        .merge(solve_routes)
}
