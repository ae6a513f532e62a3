use crate::domain::ports::Storage;
use crate::utils::error::{BreachError, Result};
use crate::utils::validation::is_valid_email;
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Text,
    Csv,
    Json,
}

impl InputFormat {
    /// 依副檔名判斷，其他一律當純文字處理
    pub fn from_path(path: &str) -> Self {
        match extension(path).as_deref() {
            Some("json") => InputFormat::Json,
            Some("csv") => InputFormat::Csv,
            _ => InputFormat::Text,
        }
    }
}

pub(crate) fn extension(path: &str) -> Option<String> {
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

/// Pulls every candidate containing `@` out of the raw file content.
pub fn extract_candidates(format: InputFormat, data: &[u8]) -> Result<Vec<String>> {
    match format {
        InputFormat::Text => {
            let text = String::from_utf8_lossy(data);
            Ok(text
                .lines()
                .map(str::trim)
                .filter(|line| line.contains('@'))
                .map(str::to_string)
                .collect())
        }
        InputFormat::Csv => {
            let mut reader = csv::ReaderBuilder::new()
                .has_headers(false)
                .flexible(true)
                .from_reader(data);

            let mut emails = Vec::new();
            for row in reader.records() {
                let row = row?;
                emails.extend(
                    row.iter()
                        .filter(|cell| cell.contains('@'))
                        .map(|cell| cell.trim().to_string()),
                );
            }
            Ok(emails)
        }
        InputFormat::Json => {
            let value: serde_json::Value = serde_json::from_slice(data)?;
            let mut emails = Vec::new();
            match value {
                serde_json::Value::Array(items) => collect_strings(&items, &mut emails),
                serde_json::Value::Object(map) => {
                    for value in map.values() {
                        match value {
                            serde_json::Value::Array(items) => collect_strings(items, &mut emails),
                            serde_json::Value::String(s) if s.contains('@') => {
                                emails.push(s.trim().to_string())
                            }
                            _ => {}
                        }
                    }
                }
                _ => {
                    return Err(BreachError::InputError {
                        message: "JSON input must be an array or an object".to_string(),
                    })
                }
            }
            Ok(emails)
        }
    }
}

fn collect_strings(items: &[serde_json::Value], emails: &mut Vec<String>) {
    emails.extend(
        items
            .iter()
            .filter_map(|item| item.as_str())
            .filter(|s| s.contains('@'))
            .map(|s| s.trim().to_string()),
    );
}

/// Drops duplicates (first occurrence wins) and anything that is not a plausible address.
pub fn normalize_emails(candidates: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|email| is_valid_email(email))
        .filter(|email| seen.insert(email.clone()))
        .collect()
}

pub async fn load_emails<S: Storage>(storage: &S, path: &str) -> Result<Vec<String>> {
    let format = InputFormat::from_path(path);
    tracing::debug!("Reading emails from {} as {:?}", path, format);

    let data = storage.read_file(path).await?;
    let candidates = extract_candidates(format, &data)?;
    let total = candidates.len();
    let emails = normalize_emails(candidates);

    if emails.len() < total {
        tracing::debug!("Skipped {} duplicate or invalid entries", total - emails.len());
    }
    tracing::info!("Loaded {} valid email addresses from {}", emails.len(), path);
    Ok(emails)
}
