use crate::error::SolveError;
use crate::models::GoodsList;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 误差阈值：最优误差 <= 该值即视为求解成功
pub const ERROR_TOLERANCE: f64 = 1e-7;

/// 默认迭代上限
pub const DEFAULT_MAX_ITERATIONS: u64 = 1_000_000;

/// 搜索参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchParameters {
    /// 目标总金额 (> 0)
    pub target_total: f64,
    /// 单价允许的最大浮动 (>= 0)
    pub fluctuation: f64,
    /// 迭代上限，超过后停止并返回未求解
    pub max_iterations: u64,
}

impl SearchParameters {
    pub fn new(target_total: f64, fluctuation: f64) -> Self {
        Self {
            target_total,
            fluctuation,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: u64) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn validate(&self) -> Result<(), SolveError> {
        if !self.target_total.is_finite() || self.target_total <= 0.0 {
            return Err(SolveError::InvalidInput(format!(
                "target total must be a positive number, got {}",
                self.target_total
            )));
        }
        if !self.fluctuation.is_finite() || self.fluctuation < 0.0 {
            return Err(SolveError::InvalidInput(format!(
                "fluctuation must be >= 0, got {}",
                self.fluctuation
            )));
        }
        if self.max_iterations == 0 {
            return Err(SolveError::InvalidInput(
                "max iterations must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// 搜索引擎类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// 扰动单价 + 随机顺序分配数量 + 补齐项调整
    #[default]
    Stochastic,
    /// 先贪心定数量，再整体微调单价
    Greedy,
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineKind::Stochastic => f.write_str("stochastic"),
            EngineKind::Greedy => f.write_str("greedy"),
        }
    }
}

impl FromStr for EngineKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stochastic" => Ok(EngineKind::Stochastic),
            "greedy" | "fast" => Ok(EngineKind::Greedy),
            other => Err(format!("unknown engine: {}", other)),
        }
    }
}

/// 引擎停止时的状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    Solved,
    Exhausted,
}

/// 一次求解的结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub solved: bool,
    pub engine: EngineKind,
    pub best_allocation: GoodsList,
    /// 最优绝对误差
    pub residual_error: f64,
    pub target_total: f64,
    /// 最优方案的合计金额
    pub total: f64,
    /// total - target_total
    pub signed_error: f64,
    pub iterations: u64,
    pub seed: u64,
    pub finished_at: DateTime<Utc>,
}
