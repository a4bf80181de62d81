pub mod goods;
pub mod search;
pub mod state;

pub use goods::{GoodsItem, GoodsList, QuantityRange};
pub use search::{
    EngineKind, SearchOutcome, SearchParameters, SearchResult, DEFAULT_MAX_ITERATIONS,
    ERROR_TOLERANCE,
};
pub use state::{AllocationState, BestAnswer};
