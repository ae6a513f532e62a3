use anyhow::Context;
use breach_check::config;
use breach_check::domain::ports::{BreachLookup, ConfigProvider, Storage};
use breach_check::utils::error::ErrorSeverity;
use breach_check::utils::{
    logger,
    validation::{is_valid_email, Validate},
};
use breach_check::{
    BreachChecker, BreachError, CheckEngine, CliConfig, HibpClient, LocalStorage,
    RunReport, SystemClock, TomlConfig,
};
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;

const DEFAULT_OUTPUT: &str = "results.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env 要在解析參數前載入，clap 的 env 預設值才看得到
    let env_file = config::load_env_file(None);
    let cli = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(cli.verbose, cli.log_json, cli.log_file.as_deref().map(Path::new))
        .context("Failed to open log file")?;
    tracing::info!("Starting breach-check v{}", env!("CARGO_PKG_VERSION"));
    if let Some(path) = env_file {
        tracing::debug!("Loaded environment from {}", path.display());
    }

    print_banner();

    let result = match &cli.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            match TomlConfig::from_file(path) {
                Ok(toml) => run(&cli, &toml, toml.output_path()).await,
                Err(e) => Err(anyhow::Error::new(e).context(format!("Failed to load config file '{}'", path))),
            }
        }
        None => run(&cli, &cli, None).await,
    };

    match result {
        Ok(report) => {
            print_summary(&report);
            Ok(())
        }
        Err(e) => {
            let Some(breach_error) = e.downcast_ref::<BreachError>() else {
                tracing::error!("❌ {:#}", e);
                eprintln!("❌ {:#}", e);
                std::process::exit(1);
            };

            // 記錄詳細錯誤信息
            tracing::error!(
                "❌ Run failed: {:#} (Category: {:?}, Severity: {:?})",
                e,
                breach_error.category(),
                breach_error.severity()
            );
            eprintln!("❌ {}", breach_error.user_friendly_message());
            eprintln!("💡 Suggestion: {}", breach_error.recovery_suggestion());

            // 根據錯誤嚴重程度決定退出碼
            let exit_code = match breach_error.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
            Ok(())
        }
    }
}

async fn run<C>(cli: &CliConfig, config: &C, configured_output: Option<&str>) -> anyhow::Result<RunReport>
where
    C: ConfigProvider + Validate,
{
    cli.validate()?;
    config.validate()?;

    println!(
        "⚙️  Rate limiting: {} requests/hour, {:.1}s delay between requests\n",
        config.hourly_limit(),
        config.request_delay().as_secs_f64()
    );

    let api_key = match config.api_key().or(cli.api_key.as_deref()) {
        Some(key) => key.to_string(),
        None => prompt_api_key().context("Failed to read API key")?,
    };
    if api_key.is_empty() {
        return Err(BreachError::MissingConfigError {
            field: "api_key".to_string(),
        }
        .into());
    }

    let lookup = HibpClient::new(
        config.api_base_url(),
        &api_key,
        config.user_agent(),
        config.request_timeout(),
    )?;
    let checker = BreachChecker::from_config(lookup, Arc::new(SystemClock), config)?;
    let mut engine = CheckEngine::new(checker, LocalStorage::new("."));

    let emails = resolve_emails(cli, &engine).await?;

    let output = match cli.output.as_deref().or(configured_output) {
        Some(path) => path.to_string(),
        None => {
            let answer = prompt("Enter output file path (e.g., results.json): ")
                .context("Failed to read output path")?;
            if answer.is_empty() {
                DEFAULT_OUTPUT.to_string()
            } else {
                answer
            }
        }
    };

    Ok(engine.run(&emails, &output).await?)
}

async fn resolve_emails<L, S>(cli: &CliConfig, engine: &CheckEngine<L, S>) -> anyhow::Result<Vec<String>>
where
    L: BreachLookup,
    S: Storage,
{
    if let Some(file) = &cli.file {
        return Ok(engine.load_emails(file).await?);
    }
    if let Some(email) = &cli.email {
        return single_email(email);
    }

    // 互動模式
    let choice = prompt("Do you want to check a single email address? (y/n): ")?;
    if matches!(choice.to_lowercase().as_str(), "y" | "yes") {
        let email = prompt("Enter email address: ")?;
        single_email(&email)
    } else {
        let file = prompt("Enter path to file containing email addresses: ")?;
        Ok(engine.load_emails(&file).await?)
    }
}

fn single_email(email: &str) -> anyhow::Result<Vec<String>> {
    let email = email.trim();
    if is_valid_email(email) {
        Ok(vec![email.to_string()])
    } else {
        Err(BreachError::InputError {
            message: format!("Invalid email address format: {}", email),
        }
        .into())
    }
}

fn prompt_api_key() -> io::Result<String> {
    println!("🔑 Have I Been Pwned API key required!");
    println!("You can get your API key from: https://haveibeenpwned.com/API/Key");
    println!("Set it as environment variable: export HIBP_API_KEY='your_key_here'");
    prompt("Enter your API key: ")
}

fn prompt(message: &str) -> io::Result<String> {
    print!("{}", message);
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn print_banner() {
    println!("==============================================================");
    println!("  Dark Web Checker - Email Breach Detection Tool v{}", env!("CARGO_PKG_VERSION"));
    println!("  Powered by Have I Been Pwned API");
    println!("==============================================================\n");
}

fn print_summary(report: &RunReport) {
    let summary = &report.summary;
    println!("\n📊 Summary:");
    println!("   Total emails checked: {}", summary.total);
    println!("   🚨 Found in breaches: {}", summary.found);
    println!("   ✅ Clean: {}", summary.clean);
    println!("   ❌ Errors: {}", summary.errors);
    println!("   📄 Results saved to: {}", report.output_path);

    if summary.found > 0 {
        println!(
            "\n⚠️  {} email(s) found in data breaches!",
            summary.found
        );
        println!("   Consider changing passwords and enabling 2FA for affected accounts.");
    }
}
