pub mod checker;
pub mod rate_limiter;

pub use crate::domain::model::{BreachRecord, BreachResult, BreachStatus, LookupResponse, RunSummary};
pub use crate::domain::ports::{BreachLookup, Clock, ConfigProvider, Storage};
pub use crate::utils::error::Result;
