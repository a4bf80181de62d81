//! 金额舍入
//!
//! 所有参与比较或求和的金额都先经过 [`round_money`]，避免浮点漂移。

use serde::{Deserialize, Serialize};

/// 默认精度：100 即保留两位小数（是缩放因子，不是位数）
pub const MONEY_PRECISION: f64 = 100.0;

/// 最小正单价（一分钱）
pub const MIN_PRICE: f64 = 1.0 / MONEY_PRECISION;

/// 舍入方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RoundingMode {
    /// 向下取整
    RoundDown,
    /// 向上取整
    RoundUp,
    /// 四舍五入
    #[default]
    HalfAdjust,
}

/// 按精度和舍入方式处理金额
pub fn round_with(amount: f64, precision: f64, mode: RoundingMode) -> f64 {
    let scaled = amount * precision;
    match mode {
        RoundingMode::RoundDown => scaled.floor() / precision,
        RoundingMode::RoundUp => scaled.ceil() / precision,
        RoundingMode::HalfAdjust => (scaled + 0.5).floor() / precision,
    }
}

/// 两位小数、四舍五入
#[inline]
pub fn round_money(amount: f64) -> f64 {
    round_with(amount, MONEY_PRECISION, RoundingMode::HalfAdjust)
}

/// 单行金额 = round(单价 × 数量)
#[inline]
pub fn line_money(price: f64, quantity: u64) -> f64 {
    round_money(price * quantity as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounding_modes() {
        assert_eq!(round_with(1.234, 100.0, RoundingMode::RoundDown), 1.23);
        assert_eq!(round_with(1.231, 100.0, RoundingMode::RoundUp), 1.24);
        assert_eq!(round_with(1.235, 1000.0, RoundingMode::HalfAdjust), 1.235);
        assert_eq!(round_money(2.004), 2.0);
        assert_eq!(round_money(2.006), 2.01);
        assert_eq!(round_with(7.5, 1.0, RoundingMode::HalfAdjust), 8.0);
    }

    #[test]
    fn test_half_adjust_is_idempotent() {
        let samples = [0.0, 0.005, 1.0049, 172.5, 212.345, 999.999, 120000.0, 33.333_333, -4.567];
        for &amount in &samples {
            for &precision in &[1.0, 10.0, 100.0, 1000.0] {
                let once = round_with(amount, precision, RoundingMode::HalfAdjust);
                let twice = round_with(once, precision, RoundingMode::HalfAdjust);
                assert_eq!(once, twice, "amount={} precision={}", amount, precision);
            }
        }
    }

    #[test]
    fn test_line_money() {
        assert_eq!(line_money(200.0, 3), 600.0);
        assert_eq!(line_money(172.5, 0), 0.0);
        assert_eq!(line_money(0.333, 3), 1.0);
    }
}
