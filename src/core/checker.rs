use crate::core::rate_limiter::RateLimiter;
use crate::core::{BreachLookup, BreachResult, Clock, ConfigProvider, LookupResponse};
use crate::utils::error::{BreachError, Result};
use std::sync::Arc;
use std::time::Duration;

/// Wait applied before retrying an email the provider throttled.
pub const DEFAULT_THROTTLE_COOLDOWN: Duration = Duration::from_secs(6);

/// Runs lookups one email at a time through the hourly [`RateLimiter`].
pub struct BreachChecker<L: BreachLookup> {
    lookup: L,
    clock: Arc<dyn Clock>,
    limiter: RateLimiter,
    throttle_cooldown: Duration,
    max_throttle_retries: Option<u32>,
}

impl<L: BreachLookup> BreachChecker<L> {
    pub fn new(lookup: L, clock: Arc<dyn Clock>, limiter: RateLimiter) -> Self {
        Self {
            lookup,
            clock,
            limiter,
            throttle_cooldown: DEFAULT_THROTTLE_COOLDOWN,
            max_throttle_retries: None,
        }
    }

    pub fn from_config<C: ConfigProvider>(lookup: L, clock: Arc<dyn Clock>, config: &C) -> Result<Self> {
        let limiter = RateLimiter::new(clock.clone(), config.hourly_limit(), config.request_delay())?;
        Ok(Self::new(lookup, clock, limiter)
            .with_throttle_cooldown(config.throttle_cooldown())
            .with_max_throttle_retries(config.max_throttle_retries()))
    }

    pub fn with_throttle_cooldown(mut self, cooldown: Duration) -> Self {
        self.throttle_cooldown = cooldown;
        self
    }

    /// `None` keeps retrying a throttled email until the provider answers.
    pub fn with_max_throttle_retries(mut self, max_retries: Option<u32>) -> Self {
        self.max_throttle_retries = max_retries;
        self
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Checks a single, already validated email. Never fails: every outcome
    /// ends up in the returned [`BreachResult`].
    pub async fn check(&mut self, email: &str) -> BreachResult {
        let mut throttled = 0u32;

        loop {
            self.limiter.await_slot().await;

            tracing::info!(
                "Checking email: {} (Requests this hour: {})",
                email,
                self.limiter.calls_in_window() + 1
            );
            self.limiter.record_call(self.clock.now());

            let response = match self.lookup.lookup(email).await {
                Ok(response) => response,
                Err(e) => {
                    let detail = match e {
                        BreachError::HttpError(e) => format!("Network error: {}", e),
                        other => format!("Unexpected error: {}", other),
                    };
                    tracing::error!("❌ {} ({})", detail, email);
                    return BreachResult::error(email, detail, self.clock.now());
                }
            };

            match response {
                LookupResponse::Found(breaches) if !breaches.is_empty() => {
                    tracing::info!("🚨 Found {} breaches for {}", breaches.len(), email);
                    return BreachResult::found(email, breaches, self.clock.now());
                }
                LookupResponse::Found(_) | LookupResponse::NotFound => {
                    tracing::info!("✅ No breaches found for {}", email);
                    return BreachResult::clean(email, self.clock.now());
                }
                LookupResponse::Throttled { retry_after } => {
                    throttled += 1;
                    if self.max_throttle_retries.is_some_and(|max| throttled > max) {
                        let detail = format!("Provider throttled {} consecutive requests", throttled);
                        tracing::error!("❌ {} ({})", detail, email);
                        return BreachResult::error(email, detail, self.clock.now());
                    }

                    tracing::warn!(
                        "Rate limit exceeded by API (retry-after: {:?}). Waiting {:?} before retrying {}",
                        retry_after,
                        self.throttle_cooldown,
                        email
                    );
                    self.clock.sleep(self.throttle_cooldown).await;
                }
                LookupResponse::Failure { status, body } => {
                    let detail = format!("API error {}: {}", status, body);
                    tracing::error!("❌ {} ({})", detail, email);
                    return BreachResult::error(email, detail, self.clock.now());
                }
            }
        }
    }

    /// Checks every email in order, pausing `inter_call_delay` between them.
    pub async fn check_all(&mut self, emails: &[String]) -> Vec<BreachResult> {
        let mut results = Vec::with_capacity(emails.len());
        let delay = self.limiter.inter_call_delay();

        for (i, email) in emails.iter().enumerate() {
            tracing::info!("[{}/{}] Checking: {}", i + 1, emails.len(), email);
            results.push(self.check(email).await);

            if i + 1 < emails.len() && !delay.is_zero() {
                self.clock.sleep(delay).await;
            }
        }

        results
    }
}
