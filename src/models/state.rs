use crate::models::GoodsList;

/// 目前找到的最优方案
///
/// 只有 [`BestAnswer::record`] 能修改它，误差单调不增。
#[derive(Debug, Clone)]
pub struct BestAnswer {
    goods: GoodsList,
    error: f64,
}

impl BestAnswer {
    pub fn new() -> Self {
        Self {
            goods: GoodsList::default(),
            error: f64::INFINITY,
        }
    }

    /// `|error|` 严格小于当前最优时整体替换快照，返回是否更新
    pub fn record(&mut self, error: f64, configuration: &GoodsList) -> bool {
        let error = error.abs();
        if error < self.error {
            self.error = error;
            self.goods.clone_from(configuration);
            true
        } else {
            false
        }
    }

    pub fn error(&self) -> f64 {
        self.error
    }

    pub fn goods(&self) -> &GoodsList {
        &self.goods
    }

    pub fn into_goods(self) -> GoodsList {
        self.goods
    }
}

impl Default for BestAnswer {
    fn default() -> Self {
        Self::new()
    }
}

/// 引擎的工作集：每轮被修改的工作副本、最优方案
#[derive(Debug, Clone)]
pub struct AllocationState {
    pub working: GoodsList,
    pub best: BestAnswer,
}

impl AllocationState {
    pub fn new(working: GoodsList) -> Self {
        Self {
            working,
            best: BestAnswer::new(),
        }
    }

    /// 把当前工作副本作为候选
    pub fn record_working(&mut self, error: f64) -> bool {
        self.best.record(error, &self.working)
    }

    /// 所有商品取有效最小数量、原始单价，作为基线候选记录
    pub fn record_baseline(&mut self, target_total: f64) -> bool {
        self.working.reset_to_minimum();
        let error = self.working.total_money() - target_total;
        self.record_working(error)
    }

    pub fn best_error(&self) -> f64 {
        self.best.error()
    }
}
