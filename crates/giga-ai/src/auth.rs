//! OAuth access tokens for the chat service.
//!
//! A token is fetched once at startup and attached to every chat request.
//! It is never refreshed: a run that outlives it fails on the next request.

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::AiError;

pub const DEFAULT_OAUTH_URL: &str = "https://ngw.devices.sberbank.ru:9443/api/v2/oauth";
pub const DEFAULT_SCOPE: &str = "GIGACHAT_API_PERS";

/// Tokens expiring sooner than this are reported at startup.
const SHORT_LIVED_SECS: i64 = 60;

/// Anything that can produce an access token for the chat endpoint.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<AccessToken, AiError>;
}

#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl AccessToken {
    pub fn expires_within(&self, window: Duration, now: DateTime<Utc>) -> bool {
        self.expires_at - now < window
    }
}

/// Where and how to ask for a token.
#[derive(Clone)]
pub struct OAuthConfig {
    pub url: String,
    pub scope: String,
    /// Sent as the `RqUID` header.
    pub rq_uid: String,
    /// Base64 client credentials for `Authorization: Basic`.
    pub auth_key: String,
}

impl fmt::Debug for OAuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthConfig")
            .field("url", &self.url)
            .field("scope", &self.scope)
            .field("rq_uid", &self.rq_uid)
            .field("auth_key", &"[REDACTED]")
            .finish()
    }
}

impl OAuthConfig {
    pub fn new(rq_uid: impl Into<String>, auth_key: impl Into<String>) -> Self {
        Self {
            url: DEFAULT_OAUTH_URL.to_string(),
            scope: DEFAULT_SCOPE.to_string(),
            rq_uid: rq_uid.into(),
            auth_key: auth_key.into(),
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }
}

pub struct OAuthClient {
    http: reqwest::Client,
    config: OAuthConfig,
}

impl OAuthClient {
    pub fn new(http: reqwest::Client, config: OAuthConfig) -> Self {
        Self { http, config }
    }
}

#[async_trait]
impl TokenProvider for OAuthClient {
    async fn access_token(&self) -> Result<AccessToken, AiError> {
        debug!(url = %self.config.url, scope = %self.config.scope, "requesting access token");

        let response = self
            .http
            .post(&self.config.url)
            .header(ACCEPT, "application/json")
            .header("RqUID", &self.config.rq_uid)
            .header(AUTHORIZATION, format!("Basic {}", self.config.auth_key))
            .form(&[("scope", self.config.scope.as_str())])
            .send()
            .await
            .map_err(|e| AiError::Auth(format!("token request failed: {e}")))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(AiError::Auth("credentials rejected (HTTP 401)".to_string()));
        }
        let body = response
            .text()
            .await
            .map_err(|e| AiError::Auth(format!("token response unreadable: {e}")))?;
        if !status.is_success() {
            return Err(AiError::Auth(format!("HTTP {status}: {body}")));
        }

        let token = parse_token_response(&body)?;
        if token.expires_within(Duration::seconds(SHORT_LIVED_SECS), Utc::now()) {
            warn!(expires_at = %token.expires_at, "access token expires in under a minute");
        }
        info!(expires_at = %token.expires_at, "access token acquired");
        Ok(token)
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    /// Unix epoch milliseconds.
    expires_at: i64,
}

/// Decode the token endpoint's JSON body.
pub fn parse_token_response(body: &str) -> Result<AccessToken, AiError> {
    let parsed: TokenResponse = serde_json::from_str(body)
        .map_err(|e| AiError::Auth(format!("malformed token response: {e}")))?;
    if parsed.access_token.is_empty() {
        return Err(AiError::Auth("token response has an empty access_token".to_string()));
    }
    let expires_at = DateTime::from_timestamp_millis(parsed.expires_at).ok_or_else(|| {
        AiError::Auth(format!("expires_at out of range: {}", parsed.expires_at))
    })?;
    Ok(AccessToken {
        token: parsed.access_token,
        expires_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Reply, TestServer};

    fn oauth_for(server: &TestServer, scope: &str) -> OAuthClient {
        OAuthClient::new(
            reqwest::Client::builder().no_proxy().build().unwrap(),
            OAuthConfig::new("rq-1", "a2V5OnNlY3JldA==")
                .with_url(format!("{}/api/v2/oauth", server.url))
                .with_scope(scope),
        )
    }

    #[tokio::test]
    async fn fetches_a_token_with_credentials_headers() {
        let server = TestServer::start(Reply::json(
            200,
            r#"{"access_token":"eyJhbGci","expires_at":4102444800000}"#,
        ))
        .await;

        let token = oauth_for(&server, DEFAULT_SCOPE).access_token().await.unwrap();
        assert_eq!(token.token, "eyJhbGci");
        assert_eq!(token.expires_at.timestamp_millis(), 4102444800000);

        let seen = server.request().await;
        assert!(seen.request_line.starts_with("POST /api/v2/oauth "), "{}", seen.request_line);
        assert_eq!(seen.header("rquid"), Some("rq-1"));
        assert_eq!(seen.header("authorization"), Some("Basic a2V5OnNlY3JldA=="));
        assert_eq!(seen.header("accept"), Some("application/json"));
        assert_eq!(
            seen.header("content-type"),
            Some("application/x-www-form-urlencoded")
        );
        assert_eq!(seen.body_text(), "scope=GIGACHAT_API_PERS");
    }

    #[tokio::test]
    async fn scope_is_form_encoded() {
        let server = TestServer::start(Reply::json(
            200,
            r#"{"access_token":"t","expires_at":4102444800000}"#,
        ))
        .await;

        oauth_for(&server, "a b&c").access_token().await.unwrap();
        assert_eq!(server.request().await.body_text(), "scope=a+b%26c");
    }

    #[tokio::test]
    async fn rejected_credentials_are_auth_errors() {
        for status in [401, 500] {
            let server = TestServer::start(Reply::json(status, r#"{"message":"nope"}"#)).await;
            let err = oauth_for(&server, DEFAULT_SCOPE).access_token().await.unwrap_err();
            match err {
                AiError::Auth(msg) => assert!(msg.contains(&status.to_string()), "{msg}"),
                other => panic!("unexpected error for {status}: {other}"),
            }
        }
    }

    #[test]
    fn parses_token_and_millisecond_expiry() {
        let token =
            parse_token_response(r#"{"access_token":"eyJhbGci","expires_at":1706026848841}"#)
                .unwrap();
        assert_eq!(token.token, "eyJhbGci");
        assert_eq!(token.expires_at.timestamp_millis(), 1706026848841);
        assert_eq!(token.expires_at.timestamp(), 1706026848);
    }

    #[test]
    fn malformed_bodies_are_auth_errors() {
        for body in [
            "",
            "not json",
            r#"{"expires_at":1706026848841}"#,
            r#"{"access_token":"x"}"#,
            r#"{"access_token":"","expires_at":1706026848841}"#,
            r#"{"access_token":"x","expires_at":9223372036854775807}"#,
        ] {
            let err = parse_token_response(body).unwrap_err();
            assert!(matches!(err, AiError::Auth(_)), "{body}");
        }
    }

    #[test]
    fn short_lived_tokens_are_detected() {
        let now = Utc::now();
        let token = AccessToken {
            token: "t".into(),
            expires_at: now + Duration::seconds(30),
        };
        assert!(token.expires_within(Duration::seconds(SHORT_LIVED_SECS), now));

        let token = AccessToken {
            token: "t".into(),
            expires_at: now + Duration::minutes(30),
        };
        assert!(!token.expires_within(Duration::seconds(SHORT_LIVED_SECS), now));
    }

    #[test]
    fn debug_redacts_secrets() {
        let config = OAuthConfig::new("rq-1", "c2VjcmV0");
        let debug = format!("{config:?}");
        assert!(!debug.contains("c2VjcmV0"));
        assert!(debug.contains("rq-1"));

        let token = AccessToken {
            token: "eyJhbGci".into(),
            expires_at: Utc::now(),
        };
        assert!(!format!("{token:?}").contains("eyJhbGci"));
    }

    #[test]
    fn config_defaults() {
        let config = OAuthConfig::new("rq", "key").with_scope("GIGACHAT_API_CORP");
        assert_eq!(config.url, DEFAULT_OAUTH_URL);
        assert_eq!(config.scope, "GIGACHAT_API_CORP");
    }
}
