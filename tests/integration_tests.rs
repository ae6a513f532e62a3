use anyhow::Result;
use breach_check::adapters::hibp::DEFAULT_USER_AGENT;
use breach_check::domain::ports::Clock;
use breach_check::{
    BreachChecker, BreachStatus, CheckEngine, HibpClient, LocalStorage, ManualClock, RateLimiter,
};
use chrono::TimeDelta;
use httpmock::prelude::*;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn hibp_client(base_url: &str) -> Result<HibpClient> {
    Ok(HibpClient::new(
        base_url,
        "integration-key",
        DEFAULT_USER_AGENT,
        Duration::from_secs(5),
    )?)
}

fn checker(
    client: HibpClient,
    clock: &Arc<ManualClock>,
    hourly_limit: usize,
) -> Result<BreachChecker<HibpClient>> {
    let limiter = RateLimiter::new(clock.clone(), hourly_limit, Duration::from_millis(1600))?;
    Ok(BreachChecker::new(client, clock.clone(), limiter))
}

#[tokio::test]
async fn test_end_to_end_file_to_json_report() -> Result<()> {
    let temp_dir = TempDir::new()?;
    tokio::fs::write(
        temp_dir.path().join("emails.csv"),
        "name,email\nAlice,alice@example.com\nBob,bob@example.com\nOops,broken@\nCarol,carol@example.com\n",
    )
    .await?;

    let server = MockServer::start();
    let alice = server.mock(|when, then| {
        when.method(GET)
            .path("/breachedaccount/alice@example.com")
            .query_param("truncateResponse", "false")
            .header("hibp-api-key", "integration-key");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!([
                {"Name": "Adobe", "BreachDate": "2013-10-04"},
                {"Name": "Canva", "BreachDate": "2019-05-24"},
                {"Name": "Dropbox", "BreachDate": "2012-07-01"}
            ]));
    });
    let bob = server.mock(|when, then| {
        when.method(GET).path("/breachedaccount/bob@example.com");
        then.status(404);
    });
    let carol = server.mock(|when, then| {
        when.method(GET).path("/breachedaccount/carol@example.com");
        then.status(503).body("Service Unavailable");
    });

    let clock = Arc::new(ManualClock::default());
    let checker = checker(hibp_client(&server.base_url())?, &clock, 100)?;
    let mut engine = CheckEngine::new(checker, LocalStorage::new(temp_dir.path()));

    let emails = engine.load_emails("emails.csv").await?;
    assert_eq!(
        emails,
        vec!["alice@example.com", "bob@example.com", "carol@example.com"]
    );

    let report = engine.run(&emails, "out/results.json").await?;

    alice.assert();
    bob.assert();
    carol.assert();
    assert_eq!(report.summary.found, 1);
    assert_eq!(report.summary.clean, 1);
    assert_eq!(report.summary.errors, 1);
    // 三筆之間各延遲一次
    assert_eq!(clock.sleeps(), vec![Duration::from_millis(1600); 2]);

    let saved = tokio::fs::read(temp_dir.path().join("out/results.json")).await?;
    let json: serde_json::Value = serde_json::from_slice(&saved)?;
    assert_eq!(json[0]["email"], "alice@example.com");
    assert_eq!(json[0]["status"], "found");
    assert_eq!(json[0]["breach_count"], 3);
    assert_eq!(json[0]["breaches"][2]["Name"], "Dropbox");
    assert_eq!(json[1]["status"], "clean");
    assert_eq!(json[2]["status"], "error");
    assert_eq!(json[2]["error"], "API error 503: Service Unavailable");

    Ok(())
}

#[tokio::test]
async fn test_hourly_limit_blocks_third_call_for_an_hour() -> Result<()> {
    let server = MockServer::start();
    let lookups = server.mock(|when, then| {
        when.method(GET).path_contains("/breachedaccount/");
        then.status(404);
    });

    let clock = Arc::new(ManualClock::default());
    let start = clock.now();
    let mut checker = checker(hibp_client(&server.base_url())?, &clock, 2)?;
    let emails: Vec<String> = ["a@example.com", "b@example.com", "c@example.com"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    let results = checker.check_all(&emails).await;

    assert_eq!(lookups.hits(), 3);
    assert!(results.iter().all(|r| r.status == BreachStatus::Clean));
    // 第三筆要等到第一筆滿一小時
    assert_eq!(results[2].checked_at - start, TimeDelta::seconds(3600));
    assert!(clock
        .sleeps()
        .iter()
        .all(|d| *d <= Duration::from_secs(60)));

    Ok(())
}

#[tokio::test]
async fn test_persistent_throttling_respects_retry_cap() -> Result<()> {
    let server = MockServer::start();
    let throttled = server.mock(|when, then| {
        when.method(GET).path("/breachedaccount/busy@example.com");
        then.status(429).header("Retry-After", "2");
    });

    let clock = Arc::new(ManualClock::default());
    let mut checker = checker(hibp_client(&server.base_url())?, &clock, 100)?
        .with_max_throttle_retries(Some(2));

    let result = checker.check("busy@example.com").await;

    assert_eq!(throttled.hits(), 3);
    assert_eq!(result.status, BreachStatus::Error);
    assert_eq!(clock.sleeps(), vec![Duration::from_secs(6); 2]);

    Ok(())
}

#[tokio::test]
async fn test_transport_failure_is_recorded_without_retry() -> Result<()> {
    let clock = Arc::new(ManualClock::default());
    let mut checker = checker(hibp_client("http://127.0.0.1:1")?, &clock, 100)?;

    let result = checker.check("alice@example.com").await;

    assert_eq!(result.status, BreachStatus::Error);
    let detail = result.error_detail.unwrap_or_default();
    assert!(detail.starts_with("Network error:"), "{}", detail);
    assert!(clock.sleeps().is_empty());
    assert_eq!(checker.limiter().calls_in_window(), 1);

    Ok(())
}
