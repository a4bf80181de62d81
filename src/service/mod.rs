pub mod balancer;
pub mod engine;
pub mod greedy;
pub mod money;
pub mod random;
pub mod stochastic;

pub use balancer::InvoiceBalancer;
pub use engine::{SearchEngine, SearchRun};
pub use greedy::GreedySearch;
pub use money::{line_money, round_money, round_with, RoundingMode, MONEY_PRECISION};
pub use random::RandomNumberSource;
pub use stochastic::StochasticSearch;
