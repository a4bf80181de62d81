//! 随机搜索引擎
//!
//! 每一轮依次执行：
//! 1. 扰动：每个商品单价在 `[-fluctuation, +fluctuation]` 内按类正态分布浮动并舍入，浮动后不低于一分钱；
//! 2. 分配：洗牌后从尾到头（不含头部）逐个分配数量，上限按剩余预算实时重算；
//! 3. 调整：洗牌头部那一项作为补齐项，用剩余金额求出其数量，再逐项试探单价微调；
//! 4. 评估：最优误差进入容差即求解成功，否则直到迭代用尽。

use crate::models::{
    AllocationState, EngineKind, GoodsList, SearchOutcome, SearchParameters, ERROR_TOLERANCE,
};
use crate::service::engine::{floor_to_i64, Infeasible, SearchEngine, SearchRun, PROGRESS_INTERVAL};
use crate::service::money::{round_money, MIN_PRICE};
use crate::service::random::RandomNumberSource;

/// 价格容差，用于判断微调后的单价是否仍在浮动范围内
const PRICE_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, Default)]
pub struct StochasticSearch;

impl SearchEngine for StochasticSearch {
    fn kind(&self) -> EngineKind {
        EngineKind::Stochastic
    }

    fn search(
        &self,
        state: &mut AllocationState,
        params: &SearchParameters,
        rng: &mut RandomNumberSource,
    ) -> SearchRun {
        let mut order: Vec<usize> = (0..state.working.len()).collect();
        let mut iterations = 0u64;
        let mut infeasible = 0u64;

        state.record_baseline(params.target_total);

        loop {
            perturb_prices(&mut state.working, params, rng);

            let attempt = assign_quantities(&mut state.working, &mut order, params, rng)
                .and_then(|()| adjust_padding(state, params));
            if let Err(reason) = attempt {
                infeasible += 1;
                tracing::trace!("iteration {} abandoned: {:?}", iterations, reason);
            }

            iterations += 1;
            if state.best_error() <= ERROR_TOLERANCE {
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
                tracing::info!(
                    "[Stochastic] 迭代 {}, 最优误差: {:.4}, 放弃轮数: {}",
                    iterations,
                    state.best_error(),
                    infeasible
                );
            }
        }
    }
}

/// 扰动阶段：每个商品的单价 = round(原价 + 类正态浮动)
fn perturb_prices(goods: &mut GoodsList, params: &SearchParameters, rng: &mut RandomNumberSource) {
    let fluctuation = params.fluctuation;
    for item in goods.items_mut() {
        if item.base_price <= 0.0 {
            item.price = item.base_price;
            continue;
        }
        // 下界截断，浮动后的单价至少为 MIN_PRICE
        let low = (-fluctuation).max(MIN_PRICE - item.base_price);
        let delta = rng.quasi_normal_real(low, fluctuation);
        item.price = round_money(item.base_price + delta);
    }
}

/// Fisher–Yates 洗牌：从最后一个下标到 1，与 `[0, i]` 内随机下标交换
fn shuffle(order: &mut [usize], rng: &mut RandomNumberSource) {
    for i in (1..order.len()).rev() {
        let j = rng.uniform_i64(0, i as i64) as usize;
        order.swap(i, j);
    }
}

/// 可行上限：其余商品都取最小数量时，该商品最多还能买多少
///
/// `floor((目标 - 已分配金额 - 其余商品最低金额) / (原价 - 浮动))`
fn feasible_ceiling(goods: &GoodsList, idx: usize, params: &SearchParameters) -> i64 {
    let item = &goods.items()[idx];
    let assigned = goods.total_money();
    let reserved = goods.min_money_excluding(idx);
    let budget = params.target_total - assigned - reserved;

    let mut unit = item.base_price - params.fluctuation;
    if unit <= 0.0 {
        unit = item.price;
    }
    if unit <= 0.0 {
        // 零价商品不占预算，取最小数量即可
        return item.quantity_range.effective_min() as i64;
    }
    floor_to_i64(budget / unit)
}

/// 分配阶段：洗牌后从尾到头（不含头部）分配数量，头部留作补齐项
fn assign_quantities(
    goods: &mut GoodsList,
    order: &mut [usize],
    params: &SearchParameters,
    rng: &mut RandomNumberSource,
) -> Result<(), Infeasible> {
    for item in goods.items_mut() {
        item.quantity = 0;
    }
    for (i, slot) in order.iter_mut().enumerate() {
        *slot = i;
    }
    shuffle(order, rng);

    for &idx in order.iter().skip(1).rev() {
        let range = goods.items()[idx].quantity_range;
        let ceiling = feasible_ceiling(goods, idx, params);

        let min_quantity = range.effective_min() as i64;
        let max_quantity = match range.bounded_max() {
            Some(max) => i64::try_from(max).unwrap_or(i64::MAX).min(ceiling),
            None => ceiling,
        };
        if min_quantity > max_quantity {
            return Err(Infeasible::QuantityBounds { index: idx });
        }

        let quantity = rng.quasi_normal_i64(min_quantity, max_quantity);
        goods.items_mut()[idx].quantity = quantity as u64;
    }

    Ok(())
}

/// 找出唯一数量为 0 的商品
fn find_unique_padding(goods: &GoodsList) -> Option<usize> {
    let mut zeros = goods
        .iter()
        .enumerate()
        .filter(|(_, item)| item.quantity == 0)
        .map(|(i, _)| i);
    match (zeros.next(), zeros.next()) {
        (Some(idx), None) => Some(idx),
        _ => None,
    }
}

/// 调整阶段：求补齐项数量并记录候选，再逐项试探单价微调
fn adjust_padding(state: &mut AllocationState, params: &SearchParameters) -> Result<(), Infeasible> {
    let target = params.target_total;
    let padding = find_unique_padding(&state.working).ok_or(Infeasible::NoUniquePadding)?;

    let current = state.working.total_money();
    if current > target {
        return Err(Infeasible::OverTarget);
    }

    let padding_item = &state.working.items()[padding];
    if padding_item.price <= 0.0 {
        return Err(Infeasible::PaddingQuantity { index: padding });
    }
    let quantity = floor_to_i64((target - current) / padding_item.price);
    if quantity <= 0 || !padding_item.quantity_range.admits(quantity as u64) {
        return Err(Infeasible::PaddingQuantity { index: padding });
    }
    state.working.items_mut()[padding].quantity = quantity as u64;

    let deviation = state.working.total_money() - target;
    if state.record_working(deviation) {
        tracing::debug!("[Stochastic] 新的最优误差: {:.4}", deviation.abs());
    }

    // 试探：单价下调 round(偏差 / 单价)，记录后立即还原
    for i in 0..state.working.len() {
        let item = &state.working.items()[i];
        let shift = round_money(deviation / item.price);
        if shift == 0.0 {
            continue;
        }

        let original = item.price;
        let shifted = round_money(original - shift);
        if shifted <= 0.0 || (shifted - item.base_price).abs() > params.fluctuation + PRICE_EPSILON {
            continue;
        }

        state.working.items_mut()[i].price = shifted;
        let shifted_deviation = state.working.total_money() - target;
        if state.record_working(shifted_deviation) {
            tracing::debug!("[Stochastic] 新的最优误差: {:.4} (微调商品 {})", shifted_deviation.abs(), i + 1);
        }
        state.working.items_mut()[i].price = original;
    }

    Ok(())
}
