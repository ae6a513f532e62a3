pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{
    clock::{ManualClock, SystemClock},
    hibp::HibpClient,
    storage::LocalStorage,
};
pub use app::engine::{CheckEngine, RunReport};
pub use config::toml_config::TomlConfig;
pub use crate::core::{checker::BreachChecker, rate_limiter::RateLimiter};
pub use domain::model::{BreachRecord, BreachResult, BreachStatus, LookupResponse, RunSummary};
pub use utils::error::{BreachError, Result};
