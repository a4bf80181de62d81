//! 贪心搜索引擎（快速版）
//!
//! 先按原始顺序贪心确定数量（为后面的商品预留最低金额），
//! 再把剩余差额在浮动范围内分摊回单价。不探索完整的单价扰动空间，换取速度。

use crate::models::{
    AllocationState, EngineKind, GoodsList, SearchOutcome, SearchParameters, ERROR_TOLERANCE,
};
use crate::service::engine::{floor_to_i64, SearchEngine, SearchRun, PROGRESS_INTERVAL};
use crate::service::money::{line_money, round_money};
use crate::service::random::RandomNumberSource;

#[derive(Debug, Clone, Copy, Default)]
pub struct GreedySearch;

impl SearchEngine for GreedySearch {
    fn kind(&self) -> EngineKind {
        EngineKind::Greedy
    }

    fn search(
        &self,
        state: &mut AllocationState,
        params: &SearchParameters,
        rng: &mut RandomNumberSource,
    ) -> SearchRun {
        state.record_baseline(params.target_total);
        let remains = suffix_reservations(&state.working);
        let mut iterations = 0u64;

        loop {
            choose_quantities(&mut state.working, &remains, params, rng);
            nudge_prices(&mut state.working, params);

            let deviation = state.working.total_money() - params.target_total;
            if state.record_working(deviation) {
                tracing::debug!("[Greedy] 新的最优误差: {:.4}", deviation.abs());
            }

            iterations += 1;
            if deviation.abs() <= ERROR_TOLERANCE {
                return SearchRun {
                    outcome: SearchOutcome::Solved,
                    iterations,
                };
            }
            if iterations > params.max_iterations {
                return SearchRun {
                    outcome: SearchOutcome::Exhausted,
                    iterations,
                };
            }

            if iterations % PROGRESS_INTERVAL == 0 {
                tracing::info!("[Greedy] 迭代 {}, 最优误差: {:.4}", iterations, state.best_error());
            }
        }
    }
}

/// 后缀预留表：`remains[i]` 为下标 `i..n` 的商品按有效最小数量、原价的金额之和，
/// 末尾多一项 0
fn suffix_reservations(goods: &GoodsList) -> Vec<f64> {
    let mut remains = vec![0.0; goods.len() + 1];
    for (i, item) in goods.iter().enumerate().rev() {
        remains[i] = remains[i + 1] + line_money(item.base_price, item.quantity_range.effective_min());
    }
    remains
}

/// 按原始顺序确定数量：为后面的商品预留最低金额后，在 `[最小, 可负担]` 内均匀取值；
/// 预算不足时保持最小数量
fn choose_quantities(
    goods: &mut GoodsList,
    remains: &[f64],
    params: &SearchParameters,
    rng: &mut RandomNumberSource,
) {
    let mut balance = params.target_total;

    for (i, item) in goods.items_mut().iter_mut().enumerate() {
        item.price = item.base_price;
        let range = item.quantity_range;
        let min_quantity = range.effective_min() as i64;

        let affordable = if item.price > 0.0 {
            floor_to_i64((balance - remains[i + 1]) / item.price)
        } else {
            min_quantity
        };
        let upper = match range.bounded_max() {
            Some(max) => i64::try_from(max).unwrap_or(i64::MAX).min(affordable),
            None => affordable,
        };

        let quantity = if upper >= min_quantity {
            rng.uniform_i64(min_quantity, upper)
        } else {
            min_quantity
        };
        item.quantity = quantity as u64;
        balance -= item.money();
    }
}

/// 把剩余差额分摊回单价
///
/// 先按总数量算出统一的单位调整量（限制在浮动范围内），
/// 再逐项用各自剩余的浮动空间补齐残差。单价始终在 `[原价 - 浮动, 原价 + 浮动]` 内。
fn nudge_prices(goods: &mut GoodsList, params: &SearchParameters) {
    let fluctuation = params.fluctuation;
    if fluctuation <= 0.0 {
        return;
    }

    let total_quantity: u64 = goods.iter().map(|item| item.quantity).sum();
    if total_quantity == 0 {
        return;
    }

    let leftover = params.target_total - goods.total_money();
    let shared = round_money((leftover / total_quantity as f64).clamp(-fluctuation, fluctuation));
    if shared != 0.0 {
        for item in goods.items_mut() {
            let price = round_money(item.base_price + shared);
            if price > 0.0 {
                item.price = price;
            }
        }
    }

    let mut residual = params.target_total - goods.total_money();
    for item in goods.items_mut() {
        if residual.abs() <= ERROR_TOLERANCE {
            break;
        }
        if item.quantity == 0 {
            continue;
        }

        let low = round_money(item.base_price - fluctuation);
        let high = round_money(item.base_price + fluctuation);
        let wanted = round_money(item.price + residual / item.quantity as f64).clamp(low, high);
        if wanted <= 0.0 || wanted == item.price {
            continue;
        }

        let before = item.money();
        item.price = wanted;
        residual -= item.money() - before;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GoodsItem, QuantityRange};

    fn goods(items: &[(f64, u64, u64)]) -> GoodsList {
        items
            .iter()
            .map(|&(price, min, max)| GoodsItem::new(price, QuantityRange::new(min, max)))
            .collect()
    }

    #[test]
    fn test_suffix_reservations() {
        let list = goods(&[(30.0, 1, 0), (20.0, 2, 0), (5.5, 1, 0)]);
        assert_eq!(suffix_reservations(&list), vec![75.5, 45.5, 5.5, 0.0]);
    }

    #[test]
    fn test_choose_quantities_respects_budget_and_ranges() {
        let mut list = goods(&[(30.0, 1, 0), (20.0, 1, 4), (7.0, 2, 0)]);
        let remains = suffix_reservations(&list);
        let params = SearchParameters::new(300.0, 0.0);
        let mut rng = RandomNumberSource::from_seed(9);

        for _ in 0..500 {
            choose_quantities(&mut list, &remains, &params, &mut rng);
            for item in &list {
                assert!(item.quantity_range.admits(item.quantity));
            }
            assert!(list.total_money() <= 300.0);
        }
    }

    #[test]
    fn test_choose_quantities_keeps_minimum_when_broke() {
        let mut list = goods(&[(1000.0, 1, 1)]);
        let remains = suffix_reservations(&list);
        let params = SearchParameters::new(1.0, 0.0);
        let mut rng = RandomNumberSource::from_seed(9);
        choose_quantities(&mut list, &remains, &params, &mut rng);
        assert_eq!(list.items()[0].quantity, 1);
    }

    #[test]
    fn test_nudge_prices_closes_gap_within_band() {
        let mut list = goods(&[(10.0, 1, 0), (20.0, 1, 0)]);
        list.items_mut()[0].quantity = 3;
        list.items_mut()[1].quantity = 2;
        // 基准合计 70，目标 73：每件统一 +0.6
        let params = SearchParameters::new(73.0, 1.0);
        nudge_prices(&mut list, &params);

        assert_eq!(list.total_money(), 73.0);
        for item in &list {
            assert!((item.price - item.base_price).abs() <= 1.0 + 1e-9);
        }
    }

    #[test]
    fn test_nudge_prices_clamped_by_fluctuation() {
        let mut list = goods(&[(10.0, 1, 0)]);
        list.items_mut()[0].quantity = 2;
        let params = SearchParameters::new(100.0, 0.5);
        nudge_prices(&mut list, &params);
        assert_eq!(list.items()[0].price, 10.5);
    }

    #[test]
    fn test_search_finds_integer_combination() {
        let mut state = AllocationState::new(goods(&[(30.0, 1, 0), (20.0, 1, 0)]));
        let params = SearchParameters::new(100.0, 0.0);
        let mut rng = RandomNumberSource::from_seed(3);

        let run = GreedySearch.search(&mut state, &params, &mut rng);
        assert_eq!(run.outcome, SearchOutcome::Solved);
        assert_eq!(state.best.goods().total_money(), 100.0);
    }
}
