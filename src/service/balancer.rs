use crate::error::SolveError;
use crate::models::{
    AllocationState, EngineKind, GoodsItem, GoodsList, SearchOutcome, SearchParameters,
    SearchResult,
};
use crate::service::engine::SearchEngine;
use crate::service::greedy::GreedySearch;
use crate::service::money::round_money;
use crate::service::random::RandomNumberSource;
use crate::service::stochastic::StochasticSearch;
use chrono::Utc;
use std::time::Instant;

/// 发票配平服务：校验输入、归一化单价、调用所选引擎并整理结果
///
/// 随机数源由调用方注入，固定种子即可复现一次求解。
#[derive(Debug)]
pub struct InvoiceBalancer {
    rng: RandomNumberSource,
}

impl InvoiceBalancer {
    pub fn new(rng: RandomNumberSource) -> Self {
        Self { rng }
    }

    pub fn from_seed(seed: u64) -> Self {
        Self::new(RandomNumberSource::from_seed(seed))
    }

    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    /// 随机搜索引擎求解
    pub fn solve(
        &mut self,
        params: SearchParameters,
        goods: &GoodsList,
    ) -> Result<SearchResult, SolveError> {
        self.solve_with(EngineKind::Stochastic, params, goods)
    }

    /// 贪心引擎求解
    pub fn solve_fast(
        &mut self,
        params: SearchParameters,
        goods: &GoodsList,
    ) -> Result<SearchResult, SolveError> {
        self.solve_with(EngineKind::Greedy, params, goods)
    }

    pub fn solve_with(
        &mut self,
        kind: EngineKind,
        params: SearchParameters,
        goods: &GoodsList,
    ) -> Result<SearchResult, SolveError> {
        let (params, normalized) = normalize(params, goods)?;
        let engine: &dyn SearchEngine = match kind {
            EngineKind::Stochastic => &StochasticSearch,
            EngineKind::Greedy => &GreedySearch,
        };

        tracing::info!(
            "[{}] 开始求解: {} 个商品, 目标金额 {:.2}, 浮动 {:.2}, seed {}",
            engine.kind(),
            normalized.len(),
            params.target_total,
            params.fluctuation,
            self.rng.seed()
        );

        let start_time = Instant::now();
        let mut state = AllocationState::new(normalized);
        let run = engine.search(&mut state, &params, &mut self.rng);
        let solved = run.outcome == SearchOutcome::Solved;

        let residual_error = state.best_error();
        let best_allocation = state.best.into_goods();
        let total = best_allocation.total_money();

        if solved {
            tracing::info!(
                "[{}] 找到精确解: 迭代 {}, 误差 {:e}, 耗时 {:?}",
                kind,
                run.iterations,
                residual_error,
                start_time.elapsed()
            );
        } else {
            tracing::warn!(
                "[{}] 未找到精确解: 迭代 {} 次后停止, 最优误差 {:.4}, 耗时 {:?}",
                kind,
                run.iterations,
                residual_error,
                start_time.elapsed()
            );
        }

        Ok(SearchResult {
            solved,
            engine: kind,
            best_allocation,
            residual_error,
            target_total: params.target_total,
            total,
            signed_error: round_money(total - params.target_total),
            iterations: run.iterations,
            seed: self.rng.seed(),
            finished_at: Utc::now(),
        })
    }
}

/// 输入校验与归一化：浮动和单价都舍入到金额精度，工作字段清零
fn normalize(
    params: SearchParameters,
    goods: &GoodsList,
) -> Result<(SearchParameters, GoodsList), SolveError> {
    params.validate()?;
    if goods.is_empty() {
        return Err(SolveError::InvalidInput("goods list is empty".to_string()));
    }

    let mut normalized = GoodsList::default();
    for (i, item) in goods.iter().enumerate() {
        if !item.base_price.is_finite() || item.base_price < 0.0 {
            return Err(SolveError::InvalidInput(format!(
                "goods #{} has invalid price {}",
                i + 1,
                item.base_price
            )));
        }
        normalized.push(GoodsItem::new(round_money(item.base_price), item.quantity_range));
    }

    let params = SearchParameters {
        fluctuation: round_money(params.fluctuation),
        ..params
    };
    Ok((params, normalized))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QuantityRange;

    #[test]
    fn test_empty_goods_is_invalid_input() {
        let mut balancer = InvoiceBalancer::from_seed(1);
        let result = balancer.solve(SearchParameters::new(100.0, 1.0), &GoodsList::default());
        assert!(matches!(result, Err(SolveError::InvalidInput(_))));
    }

    #[test]
    fn test_negative_price_is_invalid_input() {
        let goods: GoodsList = vec![GoodsItem::new(-5.0, QuantityRange::default())].into();
        let mut balancer = InvoiceBalancer::from_seed(1);
        assert!(balancer.solve_fast(SearchParameters::new(100.0, 1.0), &goods).is_err());
    }

    #[test]
    fn test_normalize_rounds_prices_and_fluctuation() {
        let goods: GoodsList = vec![GoodsItem::new(172.499, QuantityRange::new(100, 0))].into();
        let (params, normalized) = normalize(SearchParameters::new(100.0, 2.004), &goods).unwrap();
        assert_eq!(params.fluctuation, 2.0);
        assert_eq!(normalized.items()[0].base_price, 172.5);
        assert_eq!(normalized.items()[0].price, 172.5);
    }

    #[test]
    fn test_input_is_not_mutated() {
        let goods: GoodsList = vec![GoodsItem::new(200.0, QuantityRange::new(1, 5))].into();
        let before = goods.clone();
        let mut balancer = InvoiceBalancer::from_seed(8);
        let result = balancer.solve(SearchParameters::new(600.0, 0.0), &goods).unwrap();
        assert!(result.solved);
        assert_eq!(goods, before);
        assert_eq!(result.seed, 8);
        assert_eq!(result.engine, EngineKind::Stochastic);
    }
}
