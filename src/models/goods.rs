use crate::service::money::{line_money, round_money};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 数量范围；`max == 0` 表示不限上限，`max < min` 视为无效范围（同样不限上限）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantityRange {
    pub min: u64,
    pub max: u64,
}

impl QuantityRange {
    pub const fn new(min: u64, max: u64) -> Self {
        Self { min, max }
    }

    /// 有效范围：max 非 0 且 max >= min
    pub fn is_valid(&self) -> bool {
        self.max != 0 && self.max >= self.min
    }

    /// 运行时下限，至少为 1
    pub fn effective_min(&self) -> u64 {
        self.min.max(1)
    }

    /// 有效范围时返回配置上限
    pub fn bounded_max(&self) -> Option<u64> {
        self.is_valid().then_some(self.max)
    }

    /// 数量是否满足 `>= max(min,1)` 且（范围有效时）`<= max`
    pub fn admits(&self, quantity: u64) -> bool {
        quantity >= self.effective_min() && self.bounded_max().map_or(true, |max| quantity <= max)
    }
}

impl Default for QuantityRange {
    fn default() -> Self {
        Self { min: 1, max: 0 }
    }
}

impl fmt::Display for QuantityRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.max == 0 {
            write!(f, "{}", self.min)
        } else {
            write!(f, "{}-{}", self.min, self.max)
        }
    }
}

/// 解析 `"min"` 或 `"min-max"`
///
/// 各分量只有解析为 > 0 的整数才会被采用，其余保持默认 `{1, 0}`；
/// 只有 max 合法时仍然采用 max。
impl FromStr for QuantityRange {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut range = QuantityRange::default();
        let s = s.trim();
        let positive = |part: &str| part.trim().parse::<u64>().ok().filter(|v| *v > 0);

        match s.split_once('-') {
            Some((min, max)) => {
                if let Some(min) = positive(min) {
                    range.min = min;
                }
                if let Some(max) = positive(max) {
                    range.max = max;
                }
            }
            None => {
                if let Some(min) = positive(s) {
                    range.min = min;
                }
            }
        }

        Ok(range)
    }
}

/// 发票中的一行商品
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoodsItem {
    /// 原始单价（归一化后 >= 0）
    pub base_price: f64,
    pub quantity_range: QuantityRange,
    /// 搜索过程中的当前单价
    pub price: f64,
    /// 搜索过程中的当前数量
    pub quantity: u64,
}

impl GoodsItem {
    pub fn new(base_price: f64, quantity_range: QuantityRange) -> Self {
        Self {
            base_price,
            quantity_range,
            price: base_price,
            quantity: 0,
        }
    }

    /// 单行金额
    pub fn money(&self) -> f64 {
        line_money(self.price, self.quantity)
    }

    /// 按有效最小数量、当前单价计算的最低金额
    pub fn min_money(&self) -> f64 {
        line_money(self.price, self.quantity_range.effective_min())
    }
}

/// 有序的商品列表，下标即商品编号
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GoodsList {
    items: Vec<GoodsItem>,
}

impl GoodsList {
    pub fn new(items: Vec<GoodsItem>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[GoodsItem] {
        &self.items
    }

    pub fn items_mut(&mut self) -> &mut [GoodsItem] {
        &mut self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GoodsItem> {
        self.items.iter()
    }

    pub fn push(&mut self, item: GoodsItem) {
        self.items.push(item);
    }

    /// 合计金额：逐行舍入后求和，再整体舍入一次
    pub fn total_money(&self) -> f64 {
        round_money(self.items.iter().map(GoodsItem::money).sum())
    }

    /// 除 `idx` 外，其余商品按有效最小数量的最低金额之和
    pub fn min_money_excluding(&self, idx: usize) -> f64 {
        self.items
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != idx)
            .map(|(_, item)| item.min_money())
            .sum()
    }

    /// 所有商品都取有效最小数量、原始单价
    pub fn reset_to_minimum(&mut self) {
        for item in &mut self.items {
            item.price = item.base_price;
            item.quantity = item.quantity_range.effective_min();
        }
    }
}

impl From<Vec<GoodsItem>> for GoodsList {
    fn from(items: Vec<GoodsItem>) -> Self {
        Self::new(items)
    }
}

impl FromIterator<GoodsItem> for GoodsList {
    fn from_iter<I: IntoIterator<Item = GoodsItem>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a GoodsList {
    type Item = &'a GoodsItem;
    type IntoIter = std::slice::Iter<'a, GoodsItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_quantity_range() {
        assert_eq!("100".parse::<QuantityRange>().unwrap(), QuantityRange::new(100, 0));
        assert_eq!(" 3-8 ".parse::<QuantityRange>().unwrap(), QuantityRange::new(3, 8));
        assert_eq!("abc".parse::<QuantityRange>().unwrap(), QuantityRange::default());
        assert_eq!("0-5".parse::<QuantityRange>().unwrap(), QuantityRange::new(1, 5));
        assert_eq!("7-".parse::<QuantityRange>().unwrap(), QuantityRange::new(7, 0));
        assert_eq!("".parse::<QuantityRange>().unwrap(), QuantityRange::default());
    }

    #[test]
    fn test_range_validity() {
        let unbounded = QuantityRange::new(100, 0);
        assert!(!unbounded.is_valid());
        assert_eq!(unbounded.bounded_max(), None);
        assert!(unbounded.admits(1_000_000));
        assert!(!unbounded.admits(99));

        let bounded = QuantityRange::new(0, 5);
        assert_eq!(bounded.effective_min(), 1);
        assert!(bounded.admits(5));
        assert!(!bounded.admits(6));
        assert!(!bounded.admits(0));

        assert_eq!(QuantityRange::new(0, 0).bounded_max(), None);
    }

    #[test]
    fn test_totals() {
        let mut list: GoodsList = vec![
            GoodsItem::new(30.0, QuantityRange::default()),
            GoodsItem::new(20.0, QuantityRange::new(2, 0)),
        ]
        .into();
        assert_eq!(list.total_money(), 0.0);
        assert_eq!(list.min_money_excluding(0), 40.0);
        assert_eq!(list.min_money_excluding(1), 30.0);

        list.reset_to_minimum();
        assert_eq!(list.items()[0].quantity, 1);
        assert_eq!(list.items()[1].quantity, 2);
        assert_eq!(list.total_money(), 70.0);
    }

    #[test]
    fn test_range_display() {
        assert_eq!(QuantityRange::new(100, 0).to_string(), "100");
        assert_eq!(QuantityRange::new(1, 5).to_string(), "1-5");
    }
}
