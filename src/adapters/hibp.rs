// Have I Been Pwned v3 client.

use crate::domain::model::{BreachRecord, LookupResponse};
use crate::domain::ports::BreachLookup;
use crate::utils::error::{BreachError, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, RETRY_AFTER, USER_AGENT};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use url::Url;

pub const DEFAULT_API_BASE_URL: &str = "https://haveibeenpwned.com/api/v3";
pub const DEFAULT_USER_AGENT: &str = concat!("breach-check/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const API_KEY_HEADER: &str = "hibp-api-key";

pub struct HibpClient {
    client: Client,
    base_url: Url,
}

impl HibpClient {
    pub fn new(base_url: &str, api_key: &str, user_agent: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| BreachError::InvalidConfigValueError {
            field: "api_base_url".to_string(),
            value: base_url.to_string(),
            reason: format!("Invalid URL format: {}", e),
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, header_value("api_key", api_key)?);
        headers.insert(USER_AGENT, header_value("user_agent", user_agent)?);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self { client, base_url })
    }

    fn breached_account_url(&self, email: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| BreachError::ConfigError {
                message: format!("API base URL cannot be a base: {}", self.base_url),
            })?
            .pop_if_empty()
            .push("breachedaccount")
            .push(email);
        url.query_pairs_mut()
            .append_pair("truncateResponse", "false");
        Ok(url)
    }
}

fn header_value(field: &str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| BreachError::InvalidConfigValueError {
        field: field.to_string(),
        value: "<redacted>".to_string(),
        reason: format!("Not a valid HTTP header value: {}", e),
    })
}

#[async_trait]
impl BreachLookup for HibpClient {
    async fn lookup(&self, email: &str) -> Result<LookupResponse> {
        let url = self.breached_account_url(email)?;
        tracing::debug!("Making API request to: {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        tracing::debug!("API response status: {}", status);

        match status {
            StatusCode::OK => {
                let body = response.text().await?;
                let breaches: Vec<BreachRecord> = serde_json::from_str(&body)?;
                Ok(LookupResponse::Found(breaches))
            }
            StatusCode::NOT_FOUND => Ok(LookupResponse::NotFound),
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after = response
                    .headers()
                    .get(RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.trim().parse::<u64>().ok())
                    .map(Duration::from_secs);
                Ok(LookupResponse::Throttled { retry_after })
            }
            other => {
                let body = response.text().await.unwrap_or_default();
                Ok(LookupResponse::Failure {
                    status: other.as_u16(),
                    body,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn client_for(server: &MockServer) -> HibpClient {
        HibpClient::new(
            &server.base_url(),
            "test-key",
            DEFAULT_USER_AGENT,
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_found_response_returns_records() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/breachedaccount/alice@example.com")
                .query_param("truncateResponse", "false")
                .header("hibp-api-key", "test-key");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!([
                    {"Name": "Adobe", "BreachDate": "2013-10-04"},
                    {"Name": "LinkedIn", "BreachDate": "2012-05-05"}
                ]));
        });

        let response = client_for(&server)
            .lookup("alice@example.com")
            .await
            .unwrap();

        api_mock.assert();
        match response {
            LookupResponse::Found(breaches) => {
                assert_eq!(breaches.len(), 2);
                assert_eq!(breaches[1].name(), Some("LinkedIn"));
            }
            other => panic!("unexpected response: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_not_found_response() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/breachedaccount/bob@example.com");
            then.status(404);
        });

        let response = client_for(&server).lookup("bob@example.com").await.unwrap();
        assert_eq!(response, LookupResponse::NotFound);
    }

    #[tokio::test]
    async fn test_throttled_response_reads_retry_after() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/breachedaccount/carol@example.com");
            then.status(429).header("Retry-After", "2");
        });

        let response = client_for(&server)
            .lookup("carol@example.com")
            .await
            .unwrap();
        assert_eq!(
            response,
            LookupResponse::Throttled {
                retry_after: Some(Duration::from_secs(2))
            }
        );
    }

    #[tokio::test]
    async fn test_other_status_is_failure_with_body() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/breachedaccount/dave@example.com");
            then.status(401).body("Access denied due to invalid hibp-api-key.");
        });

        let response = client_for(&server)
            .lookup("dave@example.com")
            .await
            .unwrap();
        assert_eq!(
            response,
            LookupResponse::Failure {
                status: 401,
                body: "Access denied due to invalid hibp-api-key.".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_malformed_success_body_is_serialization_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/breachedaccount/erin@example.com");
            then.status(200).body("not json");
        });

        let err = client_for(&server)
            .lookup("erin@example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, BreachError::SerializationError(_)));
    }

    #[tokio::test]
    async fn test_connection_refused_is_http_error() {
        let client = HibpClient::new(
            "http://127.0.0.1:1",
            "test-key",
            DEFAULT_USER_AGENT,
            Duration::from_secs(2),
        )
        .unwrap();

        let err = client.lookup("frank@example.com").await.unwrap_err();
        assert!(matches!(err, BreachError::HttpError(_)));
    }

    #[test]
    fn test_url_keeps_base_path() {
        let client = HibpClient::new(
            "https://haveibeenpwned.com/api/v3/",
            "k",
            DEFAULT_USER_AGENT,
            DEFAULT_REQUEST_TIMEOUT,
        )
        .unwrap();
        let url = client.breached_account_url("user+tag@example.com").unwrap();
        assert_eq!(
            url.as_str(),
            "https://haveibeenpwned.com/api/v3/breachedaccount/user+tag@example.com?truncateResponse=false"
        );
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let result = HibpClient::new("not a url", "k", DEFAULT_USER_AGENT, DEFAULT_REQUEST_TIMEOUT);
        assert!(matches!(
            result,
            Err(BreachError::InvalidConfigValueError { .. })
        ));
    }
}
