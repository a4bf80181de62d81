use crate::error::ConfigError;
use crate::models::{EngineKind, GoodsItem, GoodsList, QuantityRange, DEFAULT_MAX_ITERATIONS};
use crate::service::money::round_money;
use config::{Config, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// 默认目标总金额
pub const DEFAULT_TOTAL_PRICE: f64 = 120_000.0;
/// 默认单价浮动
pub const DEFAULT_FLUCTUATION: f64 = 2.0;
/// 发票文件最多读取的商品数
pub const MAX_GOODS_COUNT: usize = 20;

/// 内置默认商品：(单价, 最小数量, 最大数量)
const DEFAULT_GOODS: [(f64, u64, u64); 3] = [(212.00, 100, 0), (172.50, 100, 0), (226.00, 100, 0)];

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub search: SearchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// 发票配置文件
    pub invoice_file: PathBuf,
    pub engine: EngineKind,
    /// 未设置时每次随机
    pub seed: Option<u64>,
    pub max_iterations: u64,
    /// 结果 CSV 导出路径
    pub report_csv: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            search: SearchConfig {
                invoice_file: PathBuf::from("Invoice.txt"),
                engine: EngineKind::Stochastic,
                seed: None,
                max_iterations: DEFAULT_MAX_ITERATIONS,
                report_csv: None,
            },
        }
    }
}

impl AppConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意键值来源加载，未设置的项使用默认值
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup("SERVER_HOST") {
            config.server.host = host;
        }
        if let Some(port) = lookup("SERVER_PORT") {
            config.server.port = parse_value("SERVER_PORT", &port)?;
        }
        if let Some(path) = lookup("INVOICE_FILE") {
            config.search.invoice_file = PathBuf::from(path);
        }
        if let Some(engine) = lookup("INVOICE_ENGINE") {
            config.search.engine = parse_value("INVOICE_ENGINE", &engine)?;
        }
        if let Some(seed) = lookup("INVOICE_SEED") {
            config.search.seed = Some(parse_value("INVOICE_SEED", &seed)?);
        }
        if let Some(max) = lookup("INVOICE_MAX_ITERATIONS") {
            config.search.max_iterations = parse_value("INVOICE_MAX_ITERATIONS", &max)?;
        }
        if let Some(path) = lookup("INVOICE_REPORT_CSV") {
            config.search.report_csv = Some(PathBuf::from(path));
        }

        Ok(config)
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

/// 发票配置：目标金额、浮动、商品列表
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceConfig {
    pub total_price: f64,
    pub fluctuation: f64,
    pub goods: GoodsList,
}

impl Default for InvoiceConfig {
    fn default() -> Self {
        Self {
            total_price: DEFAULT_TOTAL_PRICE,
            fluctuation: DEFAULT_FLUCTUATION,
            goods: DEFAULT_GOODS
                .iter()
                .map(|&(price, min, max)| GoodsItem::new(price, QuantityRange::new(min, max)))
                .collect(),
        }
    }
}

impl InvoiceConfig {
    /// 读取 INI 格式的发票文件（键名不区分大小写）
    ///
    /// ```text
    /// TotalPrice = 120000
    /// Fluctuation = 2
    /// Price1 = 212.00
    /// Range1 = 100-500
    /// ```
    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path).format(FileFormat::Ini))
            .build()?;
        let values: HashMap<String, config::Value> = settings.try_deserialize()?;

        let entries = values
            .into_iter()
            .filter_map(|(key, value)| value.into_string().ok().map(|v| (key, v)))
            .collect();
        Ok(Self::from_entries(&entries))
    }

    /// 由键值对构造
    ///
    /// 单价缺失、无法解析、为 0 或 NaN 的商品直接丢弃；数量范围缺失时为 `{1, 不限}`。
    pub fn from_entries(entries: &HashMap<String, String>) -> Self {
        let entries: HashMap<String, &str> = entries
            .iter()
            .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim()))
            .collect();

        let number = |key: &str, default: f64| match entries.get(key) {
            None => default,
            Some(raw) if raw.is_empty() => default,
            Some(raw) => raw.parse::<f64>().unwrap_or_else(|_| {
                tracing::warn!("{} 的值 {:?} 无法解析, 使用默认值 {}", key, raw, default);
                default
            }),
        };

        let total_price = number("totalprice", DEFAULT_TOTAL_PRICE);
        let fluctuation = number("fluctuation", DEFAULT_FLUCTUATION);

        let mut goods = GoodsList::default();
        for index in 1..=MAX_GOODS_COUNT {
            let price_key = format!("price{}", index);
            if !entries.contains_key(&price_key) {
                continue;
            }

            let price = number(&price_key, 0.0);
            if price == 0.0 || price.is_nan() {
                tracing::warn!("商品 {} 的单价无效, 已忽略", index);
                continue;
            }

            let range = entries
                .get(&format!("range{}", index))
                .and_then(|raw| raw.parse::<QuantityRange>().ok())
                .unwrap_or_default();
            goods.push(GoodsItem::new(round_money(price), range));
        }

        Self {
            total_price,
            fluctuation,
            goods,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_default_invoice_config() {
        let config = InvoiceConfig::default();
        assert_eq!(config.total_price, 120_000.0);
        assert_eq!(config.fluctuation, 2.0);
        assert_eq!(config.goods.len(), 3);
        assert_eq!(config.goods.items()[1].base_price, 172.5);
        assert_eq!(config.goods.items()[2].quantity_range, QuantityRange::new(100, 0));
    }

    #[test]
    fn test_from_entries() {
        let config = InvoiceConfig::from_entries(&entries(&[
            ("TotalPrice", "600"),
            ("Fluctuation", ""),
            ("Price1", "200.004"),
            ("Range1", "1-5"),
            ("price2", "0"),
            ("Price3", "abc"),
            ("PRICE4", "35.5"),
            ("Price21", "10"),
        ]));

        assert_eq!(config.total_price, 600.0);
        assert_eq!(config.fluctuation, DEFAULT_FLUCTUATION);
        assert_eq!(config.goods.len(), 2);
        assert_eq!(config.goods.items()[0].base_price, 200.0);
        assert_eq!(config.goods.items()[0].quantity_range, QuantityRange::new(1, 5));
        assert_eq!(config.goods.items()[1].base_price, 35.5);
        assert_eq!(config.goods.items()[1].quantity_range, QuantityRange::default());
    }

    #[test]
    fn test_app_config_from_lookup() {
        let vars = entries(&[
            ("SERVER_PORT", "9090"),
            ("INVOICE_ENGINE", "greedy"),
            ("INVOICE_SEED", "42"),
            ("INVOICE_MAX_ITERATIONS", "5000"),
        ]);
        let config = AppConfig::from_lookup(|key| vars.get(key).cloned()).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.search.engine, EngineKind::Greedy);
        assert_eq!(config.search.seed, Some(42));
        assert_eq!(config.search.max_iterations, 5000);
        assert_eq!(config.search.invoice_file, PathBuf::from("Invoice.txt"));
    }

    #[test]
    fn test_app_config_rejects_bad_values() {
        let vars = entries(&[("INVOICE_SEED", "not-a-number")]);
        let err = AppConfig::from_lookup(|key| vars.get(key).cloned()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "INVOICE_SEED"));
    }
}
