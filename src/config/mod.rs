pub mod toml_config;

#[cfg(feature = "cli")]
mod cli;

#[cfg(feature = "cli")]
pub use cli::CliConfig;

use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_HOURLY_LIMIT: usize = 100;
pub const DEFAULT_REQUEST_DELAY_SECS: f64 = 1.6;
pub const DEFAULT_THROTTLE_COOLDOWN_SECS: f64 = 6.0;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// 負數或 NaN 一律視為 0，真正的檢查交給 `Validate`
pub(crate) fn seconds(value: f64) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or(Duration::ZERO)
}

/// Loads `KEY=value` pairs from a `.env` file into the process environment.
/// Variables that are already set win. Returns the file that was read, if any.
pub fn load_env_file(path: Option<&Path>) -> Option<PathBuf> {
    match path {
        Some(path) => dotenvy::from_path(path).ok().map(|_| path.to_path_buf()),
        None => dotenvy::dotenv().ok(),
    }
}
