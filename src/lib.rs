pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod report;
pub mod runner;
pub mod service;

pub use config::{AppConfig, InvoiceConfig};
pub use error::{ConfigError, SolveError};
pub use models::{EngineKind, GoodsItem, GoodsList, QuantityRange, SearchParameters, SearchResult};
pub use service::{InvoiceBalancer, RandomNumberSource};
