use thiserror::Error;

/// 求解入口的错误：只在进入搜索循环之前产生
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolveError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load invoice file: {0}")]
    File(#[from] config::ConfigError),

    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },
}
