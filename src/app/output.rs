use crate::app::input::extension;
use crate::domain::model::{BreachResult, BreachStatus};
use crate::domain::ports::Storage;
use crate::utils::error::Result;
use serde::Serialize;
use std::fmt::Write as _;

const CHECKED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Csv,
    Json,
}

impl OutputFormat {
    pub fn from_path(path: &str) -> Self {
        match extension(path).as_deref() {
            Some("json") => OutputFormat::Json,
            Some("csv") => OutputFormat::Csv,
            _ => OutputFormat::Text,
        }
    }
}

#[derive(Serialize)]
struct CsvRow<'a> {
    email: &'a str,
    status: &'a str,
    breach_count: usize,
    checked_at: String,
}

pub fn encode_results(format: OutputFormat, results: &[BreachResult]) -> Result<Vec<u8>> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_vec_pretty(results)?),
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(Vec::new());
            for result in results {
                writer.serialize(CsvRow {
                    email: &result.email,
                    status: result.status.as_str(),
                    breach_count: result.breach_count,
                    checked_at: result.checked_at.format(CHECKED_AT_FORMAT).to_string(),
                })?;
            }
            writer
                .into_inner()
                .map_err(|e| std::io::Error::other(e.to_string()).into())
        }
        OutputFormat::Text => Ok(render_text(results).into_bytes()),
    }
}

fn render_text(results: &[BreachResult]) -> String {
    let mut out = String::new();
    out.push_str("Dark Web Checker Results\n");
    out.push_str(&"=".repeat(50));
    out.push_str("\n\n");

    // 寫入 String 不會失敗
    for result in results {
        let _ = writeln!(out, "Email: {}", result.email);
        let _ = writeln!(out, "Status: {}", result.status);
        let _ = writeln!(out, "Breach Count: {}", result.breach_count);
        let _ = writeln!(out, "Checked At: {}", result.checked_at.format(CHECKED_AT_FORMAT));

        match result.status {
            BreachStatus::Found if !result.breaches.is_empty() => {
                out.push_str("Breaches:\n");
                for breach in &result.breaches {
                    let _ = writeln!(
                        out,
                        "  - {}: {}",
                        breach.name().unwrap_or("Unknown"),
                        breach.breach_date().unwrap_or("Unknown date")
                    );
                }
            }
            BreachStatus::Error => {
                let _ = writeln!(
                    out,
                    "Error: {}",
                    result.error_detail.as_deref().unwrap_or("Unknown error")
                );
            }
            _ => {}
        }

        out.push_str(&"-".repeat(30));
        out.push_str("\n\n");
    }

    out
}

pub async fn save_results<S: Storage>(storage: &S, path: &str, results: &[BreachResult]) -> Result<()> {
    let format = OutputFormat::from_path(path);
    let data = encode_results(format, results)?;

    tracing::debug!("Writing {} bytes as {:?} to {}", data.len(), format, path);
    storage.write_file(path, &data).await?;

    tracing::info!("Results saved to {}", path);
    Ok(())
}
