use crate::utils::error::Result;
use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::fmt::format::{DefaultFields, Format};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub type FileLayer<S> = tracing_subscriber::fmt::Layer<S, DefaultFields, Format, Mutex<File>>;

fn default_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("breach_check=debug,info")
        } else {
            EnvFilter::new("breach_check=info")
        }
    })
}

/// 以附加模式開啟日誌檔，必要時建立上層目錄
pub fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    Ok(file)
}

/// Plain-text layer (no ANSI colors) writing every event to `file`.
pub fn file_layer<S>(file: File) -> FileLayer<S> {
    tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(Mutex::new(file))
}

/// `RUST_LOG` takes precedence over the verbosity flag. With `log_file` set,
/// events are also appended to that file.
pub fn init_cli_logger(verbose: bool, json: bool, log_file: Option<&Path>) -> Result<()> {
    let file = log_file.map(open_log_file).transpose()?;
    let registry = tracing_subscriber::registry()
        .with(default_filter(verbose))
        .with(file.map(file_layer));

    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .json(),
            )
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false)
                    .compact(),
            )
            .init();
    }
    Ok(())
}
