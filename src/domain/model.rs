use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreachStatus {
    Found,
    Clean,
    Error,
}

impl BreachStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BreachStatus::Found => "found",
            BreachStatus::Clean => "clean",
            BreachStatus::Error => "error",
        }
    }
}

impl std::fmt::Display for BreachStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 供應商回傳的單筆外洩資料，原樣保留不做解析
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BreachRecord(pub serde_json::Map<String, serde_json::Value>);

impl BreachRecord {
    pub fn name(&self) -> Option<&str> {
        self.0.get("Name").and_then(|v| v.as_str())
    }

    pub fn breach_date(&self) -> Option<&str> {
        self.0.get("BreachDate").and_then(|v| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreachResult {
    pub email: String,
    pub status: BreachStatus,
    pub breach_count: usize,
    pub breaches: Vec<BreachRecord>,
    #[serde(rename = "error", default, skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
    pub checked_at: DateTime<Utc>,
}

impl BreachResult {
    pub fn found(email: &str, breaches: Vec<BreachRecord>, checked_at: DateTime<Utc>) -> Self {
        Self {
            email: email.to_string(),
            status: BreachStatus::Found,
            breach_count: breaches.len(),
            breaches,
            error_detail: None,
            checked_at,
        }
    }

    pub fn clean(email: &str, checked_at: DateTime<Utc>) -> Self {
        Self {
            email: email.to_string(),
            status: BreachStatus::Clean,
            breach_count: 0,
            breaches: Vec::new(),
            error_detail: None,
            checked_at,
        }
    }

    pub fn error(email: &str, detail: String, checked_at: DateTime<Utc>) -> Self {
        Self {
            email: email.to_string(),
            status: BreachStatus::Error,
            breach_count: 0,
            breaches: Vec::new(),
            error_detail: Some(detail),
            checked_at,
        }
    }
}

/// Classified answer of a single lookup. Transport failures are reported
/// through the `Err` side of [`crate::domain::ports::BreachLookup::lookup`].
#[derive(Debug, Clone, PartialEq)]
pub enum LookupResponse {
    Found(Vec<BreachRecord>),
    NotFound,
    Throttled { retry_after: Option<Duration> },
    Failure { status: u16, body: String },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub found: usize,
    pub clean: usize,
    pub errors: usize,
}

impl RunSummary {
    pub fn from_results(results: &[BreachResult]) -> Self {
        results.iter().fold(
            Self {
                total: results.len(),
                ..Self::default()
            },
            |mut summary, result| {
                match result.status {
                    BreachStatus::Found => summary.found += 1,
                    BreachStatus::Clean => summary.clean += 1,
                    BreachStatus::Error => summary.errors += 1,
                }
                summary
            },
        )
    }
}
