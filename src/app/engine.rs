use crate::app::{input, output};
use crate::core::checker::BreachChecker;
use crate::domain::model::{BreachResult, RunSummary};
use crate::domain::ports::{BreachLookup, Storage};
use crate::utils::error::{BreachError, Result};

pub struct CheckEngine<L: BreachLookup, S: Storage> {
    checker: BreachChecker<L>,
    storage: S,
}

#[derive(Debug)]
pub struct RunReport {
    pub summary: RunSummary,
    pub results: Vec<BreachResult>,
    pub output_path: String,
}

impl<L: BreachLookup, S: Storage> CheckEngine<L, S> {
    pub fn new(checker: BreachChecker<L>, storage: S) -> Self {
        Self { checker, storage }
    }

    pub async fn load_emails(&self, path: &str) -> Result<Vec<String>> {
        input::load_emails(&self.storage, path).await
    }

    /// Checks every email and writes the results. Per-email failures stay in the
    /// results; only empty input and storage problems surface as `Err`.
    pub async fn run(&mut self, emails: &[String], output_path: &str) -> Result<RunReport> {
        if emails.is_empty() {
            return Err(BreachError::InputError {
                message: "No valid email addresses found".to_string(),
            });
        }

        tracing::info!("🔍 Checking {} email address(es)...", emails.len());
        let results = self.checker.check_all(emails).await;

        output::save_results(&self.storage, output_path, &results).await?;

        let summary = RunSummary::from_results(&results);
        tracing::info!(
            "📊 Summary: total {}, found {}, clean {}, errors {}",
            summary.total,
            summary.found,
            summary.clean,
            summary.errors
        );

        Ok(RunReport {
            summary,
            results,
            output_path: output_path.to_string(),
        })
    }
}
