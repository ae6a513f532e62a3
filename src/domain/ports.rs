use crate::domain::model::LookupResponse;
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn api_base_url(&self) -> &str;
    fn api_key(&self) -> Option<&str>;
    fn user_agent(&self) -> &str;
    fn request_timeout(&self) -> Duration;
    fn hourly_limit(&self) -> usize;
    fn request_delay(&self) -> Duration;
    fn throttle_cooldown(&self) -> Duration;
    fn max_throttle_retries(&self) -> Option<u32>;
}

/// Source of wall-clock time and sleeping, injected so waits can be simulated.
#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
    async fn sleep(&self, duration: Duration);
}

#[async_trait]
pub trait BreachLookup: Send + Sync {
    /// `Err` means the request never produced a response (connection, timeout, decoding).
    async fn lookup(&self, email: &str) -> Result<LookupResponse>;
}
