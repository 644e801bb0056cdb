//! Random-user API client.
//!
//! One `GET {api_url}?results=1&nat={nationality}` per call; the first result
//! is mapped into a `UserRecord`. Every failure collapses into `FetchFailure`,
//! whose `source()` keeps the underlying `FetchCause` for logs.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;
use crate::user::{Location, Name, Picture, UserRecord};

/// The single error kind surfaced by a user fetch.
#[derive(Debug, Error)]
#[error("Failed to fetch user data")]
pub struct FetchFailure {
    #[source]
    cause: FetchCause,
}

impl FetchFailure {
    pub fn new(cause: FetchCause) -> Self {
        Self { cause }
    }

    pub fn cause(&self) -> &FetchCause {
        &self.cause
    }
}

impl From<FetchCause> for FetchFailure {
    fn from(cause: FetchCause) -> Self {
        Self::new(cause)
    }
}

/// Why a fetch failed. Diagnostic only; callers treat all causes alike.
#[derive(Debug, Error)]
pub enum FetchCause {
    #[error("HTTP error! status: {0}")]
    Status(reqwest::StatusCode),
    #[error("request timed out")]
    Timeout,
    #[error("request failed")]
    Transport(#[source] reqwest::Error),
    #[error("response body is not a random-user payload")]
    Decode(#[source] serde_json::Error),
    #[error("response contained no results")]
    EmptyResults,
}

/// Source of synthetic identities.
#[async_trait]
pub trait UserFetcher: Send + Sync {
    /// Fetches one identity.
    ///
    /// # Errors
    /// Returns `FetchFailure` on any transport, status or payload problem.
    async fn fetch(&self) -> Result<UserRecord, FetchFailure>;
}

#[derive(Debug, Deserialize)]
struct RandomUserResponse {
    results: Vec<RandomUserResult>,
}

#[derive(Debug, Deserialize)]
struct RandomUserResult {
    name: Name,
    email: String,
    phone: String,
    picture: Picture,
    location: Location,
    login: RandomUserLogin,
}

#[derive(Debug, Deserialize)]
struct RandomUserLogin {
    uuid: String,
}

impl From<RandomUserResult> for UserRecord {
    fn from(result: RandomUserResult) -> Self {
        UserRecord::new(
            result.login.uuid,
            result.name,
            result.email,
            result.phone,
            result.picture,
            result.location,
        )
    }
}

/// Maps a raw response body into a record.
fn parse_user(body: &[u8]) -> Result<UserRecord, FetchCause> {
    let response: RandomUserResponse = serde_json::from_slice(body).map_err(FetchCause::Decode)?;
    response
        .results
        .into_iter()
        .next()
        .map(UserRecord::from)
        .ok_or(FetchCause::EmptyResults)
}

/// HTTP client for the random-user service.
#[derive(Debug, Clone)]
pub struct RandomUserClient {
    http: reqwest::Client,
    endpoint: url::Url,
}

impl RandomUserClient {
    /// Creates a client for `api_url`, requesting one result of `nationality`.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(mut api_url: url::Url, nationality: &str, timeout: Option<Duration>) -> Result<Self> {
        api_url
            .query_pairs_mut()
            .append_pair("results", "1")
            .append_pair("nat", nationality);

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            endpoint: api_url,
        })
    }

    /// Creates a client from config (honours DIALTONE_API_URL).
    ///
    /// # Errors
    /// Returns an error if the API URL is invalid or the client cannot be built.
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_url = config.effective_api_url()?;
        Self::new(api_url, &config.nationality, config.request_timeout())
    }

    /// Full request URL including query parameters.
    pub fn endpoint(&self) -> &url::Url {
        &self.endpoint
    }

    async fn fetch_inner(&self) -> Result<UserRecord, FetchCause> {
        let response = self
            .http
            .get(self.endpoint.clone())
            .send()
            .await
            .map_err(transport_cause)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchCause::Status(status));
        }

        let body = response.bytes().await.map_err(transport_cause)?;
        parse_user(&body)
    }
}

fn transport_cause(err: reqwest::Error) -> FetchCause {
    if err.is_timeout() {
        FetchCause::Timeout
    } else {
        FetchCause::Transport(err)
    }
}

#[async_trait]
impl UserFetcher for RandomUserClient {
    async fn fetch(&self) -> Result<UserRecord, FetchFailure> {
        debug!(url = %self.endpoint, "fetching random user");
        match self.fetch_inner().await {
            Ok(user) => {
                debug!(user_id = user.id(), "fetched random user");
                Ok(user)
            }
            Err(cause) => {
                warn!(url = %self.endpoint, cause = %cause, detail = ?cause, "random user fetch failed");
                Err(FetchFailure::new(cause))
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::test_support::random_user_body;
    use super::*;
    use crate::user::test_support::jane_doe;

    fn client_for(server: &MockServer, timeout: Option<Duration>) -> RandomUserClient {
        let url = url::Url::parse(&format!("{}/api/", server.uri())).unwrap();
        RandomUserClient::new(url, "us", timeout).unwrap()
    }

    #[test]
    fn test_parse_user_maps_fields_verbatim() {
        let user = parse_user(random_user_body("a1", "Jane", "Doe").as_bytes()).unwrap();
        assert_eq!(user, jane_doe());
    }

    #[test]
    fn test_parse_user_empty_results() {
        let cause = parse_user(br#"{"results": []}"#).unwrap_err();
        assert!(matches!(cause, FetchCause::EmptyResults));
    }

    #[test]
    fn test_parse_user_missing_login_is_decode_error() {
        let body = r#"{"results":[{"name":{"first":"a","last":"b"},"email":"e","phone":"p",
            "picture":{"large":"l","medium":"m","thumbnail":"t"},
            "location":{"city":"c","state":"s","country":"k"}}]}"#;
        let cause = parse_user(body.as_bytes()).unwrap_err();
        assert!(matches!(cause, FetchCause::Decode(_)));
    }

    #[test]
    fn test_endpoint_requests_one_result_for_nationality() {
        let url = url::Url::parse("https://randomuser.me/api/").unwrap();
        let client = RandomUserClient::new(url, "us", None).unwrap();
        assert_eq!(
            client.endpoint().as_str(),
            "https://randomuser.me/api/?results=1&nat=us"
        );
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/"))
            .and(query_param("results", "1"))
            .and(query_param("nat", "us"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(random_user_body("a1", "Jane", "Doe")),
            )
            .expect(1)
            .mount(&server)
            .await;

        let user = client_for(&server, None).fetch().await.unwrap();
        assert_eq!(user.id(), "a1");
        assert_eq!(user.full_name(), "Jane Doe");
    }

    #[tokio::test]
    async fn test_fetch_non_success_status_is_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = client_for(&server, None).fetch().await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to fetch user data");
        assert!(matches!(
            err.cause(),
            FetchCause::Status(status) if status.as_u16() == 503
        ));
        assert_eq!(
            err.source().unwrap().to_string(),
            "HTTP error! status: 503 Service Unavailable"
        );
    }

    #[tokio::test]
    async fn test_fetch_malformed_body_is_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server, None).fetch().await.unwrap_err();
        assert!(matches!(err.cause(), FetchCause::Decode(_)));
    }

    #[tokio::test]
    async fn test_fetch_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(random_user_body("a1", "Jane", "Doe"))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let err = client_for(&server, Some(Duration::from_millis(100)))
            .fetch()
            .await
            .unwrap_err();
        assert!(matches!(err.cause(), FetchCause::Timeout));
    }
}
