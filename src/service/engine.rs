use crate::models::{AllocationState, EngineKind, SearchOutcome, SearchParameters};
use crate::service::random::RandomNumberSource;

/// 每隔多少轮输出一次进度日志
pub(crate) const PROGRESS_INTERVAL: u64 = 100_000;

/// 浮点除法后向下取整前的容差，避免 0.3 / 0.1 这类结果被截掉一位
pub(crate) const FLOOR_EPSILON: f64 = 1e-9;

/// 一次搜索的运行结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchRun {
    pub outcome: SearchOutcome,
    pub iterations: u64,
}

/// 搜索策略：目标总额 → 最优分配
///
/// 引擎只修改 `state` 中的工作副本和最优方案，循环直到误差进入容差或迭代用尽。
pub trait SearchEngine {
    fn kind(&self) -> EngineKind;

    fn search(
        &self,
        state: &mut AllocationState,
        params: &SearchParameters,
        rng: &mut RandomNumberSource,
    ) -> SearchRun;
}

/// 单轮无法满足约束的原因；只会放弃当前这一轮
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Infeasible {
    /// 有效最小数量大于有效最大数量
    QuantityBounds { index: usize },
    /// 数量为 0 的商品不是恰好一个
    NoUniquePadding,
    /// 非补齐项合计已超过目标
    OverTarget,
    /// 补齐数量 <= 0 或超出其数量范围
    PaddingQuantity { index: usize },
}

/// `x` 向下取整并转成 i64；NaN 视为 0，越界饱和
pub(crate) fn floor_to_i64(x: f64) -> i64 {
    (x + FLOOR_EPSILON).floor() as i64
}
