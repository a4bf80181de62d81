use crate::config::{SearchConfig, DEFAULT_FLUCTUATION};
use crate::error::SolveError;
use crate::models::{EngineKind, GoodsItem, GoodsList, QuantityRange, SearchParameters, SearchResult};
use crate::service::InvoiceBalancer;
use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// 请求体中的一行商品
#[derive(Debug, Deserialize)]
pub struct GoodsEntry {
    pub price: f64,
    /// `"min"` 或 `"min-max"`，缺省为 `{1, 不限}`
    #[serde(default)]
    pub range: Option<String>,
}

/// 请求体: 目标金额 + 商品列表
#[derive(Debug, Deserialize)]
pub struct SolveRequest {
    pub total: f64,
    #[serde(default = "default_fluctuation")]
    pub fluctuation: f64,
    pub goods: Vec<GoodsEntry>,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub max_iterations: Option<u64>,
}

fn default_fluctuation() -> f64 {
    DEFAULT_FLUCTUATION
}

impl SolveRequest {
    fn goods(&self) -> GoodsList {
        self.goods
            .iter()
            .map(|entry| {
                let range = entry
                    .range
                    .as_deref()
                    .and_then(|raw| raw.parse::<QuantityRange>().ok())
                    .unwrap_or_default();
                GoodsItem::new(entry.price, range)
            })
            .collect()
    }
}

/// 响应体
#[derive(Debug, Serialize)]
pub struct SolveResponse {
    pub success: bool,
    pub message: String,
    pub result: Option<SearchResult>,
}

/// 健康检查
pub async fn health_check() -> &'static str {
    "OK"
}

/// 随机搜索引擎求解
pub async fn solve(
    State(settings): State<Arc<SearchConfig>>,
    Json(req): Json<SolveRequest>,
) -> Response {
    run_engine(EngineKind::Stochastic, &settings, req).await
}

/// 贪心引擎求解（更快，但不保证探索完整）
pub async fn solve_fast(
    State(settings): State<Arc<SearchConfig>>,
    Json(req): Json<SolveRequest>,
) -> Response {
    run_engine(EngineKind::Greedy, &settings, req).await
}

async fn run_engine(kind: EngineKind, settings: &SearchConfig, req: SolveRequest) -> Response {
    let goods = req.goods();
    let params = SearchParameters::new(req.total, req.fluctuation)
        .with_max_iterations(req.max_iterations.unwrap_or(settings.max_iterations));
    let mut balancer = match req.seed.or(settings.seed) {
        Some(seed) => InvoiceBalancer::from_seed(seed),
        None => InvoiceBalancer::new(crate::service::RandomNumberSource::from_entropy()),
    };

    // 搜索是纯 CPU 计算，放到阻塞线程池执行
    let outcome = tokio::task::spawn_blocking(move || balancer.solve_with(kind, params, &goods)).await;

    match outcome {
        Ok(Ok(result)) => {
            let message = if result.solved {
                format!("Found a perfect answer after {} iterations", result.iterations)
            } else {
                format!(
                    "Not found a perfect answer, best error {:.2} after {} iterations",
                    result.residual_error, result.iterations
                )
            };
            let response = SolveResponse {
                success: true,
                message,
                result: Some(result),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Ok(Err(SolveError::InvalidInput(reason))) => {
            let response = SolveResponse {
                success: false,
                message: format!("Invalid input: {}", reason),
                result: None,
            };
            (StatusCode::BAD_REQUEST, Json(response)).into_response()
        }
        Err(e) => {
            tracing::error!("[{}] search task failed: {}", kind, e);
            let response = SolveResponse {
                success: false,
                message: format!("Error: {}", e),
                result: None,
            };
            (StatusCode::INTERNAL_SERVER_ERROR, Json(response)).into_response()
        }
    }
}
