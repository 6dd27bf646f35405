//! OAuth 2.0 authorization-code flow for Google APIs.
//!
//! # Flow Overview
//!
//! 1. Generate a state token and build the authorization URL
//! 2. The browser is redirected to Google's consent page
//! 3. Google redirects back to the callback with `code` and `state`
//! 4. The callback verifies `state` and exchanges `code` here
//!
//! Authorization codes are single-use, so a failed exchange is never
//! retried.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng as _;
use secrecy::ExposeSecret;
use tracing::{debug, info, warn};

use crate::error::{ProviderError, ProviderResult};
use crate::provider::{BoxFuture, TokenExchanger};

use super::config::OAuthConfig;
use super::http;
use super::tokens::{TokenErrorResponse, TokenInfo, TokenResponse};

/// Number of random bytes in a generated state token.
const STATE_TOKEN_BYTES: usize = 16;

/// Generates a random state string for CSRF protection.
///
/// 16 random bytes, base64url encoded without padding (22 characters).
pub fn generate_state() -> String {
    let mut rng = rand::rng();
    let bytes: Vec<u8> = (0..STATE_TOKEN_BYTES).map(|_| rng.random()).collect();
    URL_SAFE_NO_PAD.encode(&bytes)
}

/// OAuth client for Google APIs.
///
/// Builds authorization URLs and exchanges authorization codes for
/// access tokens.
#[derive(Debug, Clone)]
pub struct OAuthClient {
    config: Arc<OAuthConfig>,
    http_client: reqwest::Client,
}

impl OAuthClient {
    /// Creates a new OAuth client.
    ///
    /// The exchange request is bounded by `config.timeout`.
    pub fn new(config: Arc<OAuthConfig>) -> ProviderResult<Self> {
        let http_client = http::build_client(config.timeout, &config.user_agent)?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// Builds the provider's authorization URL for the given state token.
    pub fn authorization_url(&self, state: &str) -> String {
        let endpoint = &self.config.auth_endpoint;
        let separator = if endpoint.contains('?') { '&' } else { '?' };

        format!(
            "{}{}client_id={}&redirect_uri={}&response_type=code&scope={}&state={}",
            endpoint,
            separator,
            urlencoding::encode(&self.config.credentials.client_id),
            urlencoding::encode(&self.config.redirect_url),
            urlencoding::encode(&self.config.scope_string()),
            urlencoding::encode(state),
        )
    }

    /// Exchanges an authorization code for an access token.
    ///
    /// # Errors
    ///
    /// - `Timeout`/`NetworkError` when the token endpoint cannot be reached
    ///   in time
    /// - `AuthenticationFailed` when the provider rejects the code or the
    ///   client credentials
    /// - `ServerError` on provider 5xx responses
    /// - `InvalidResponse` when the success body is not a token response
    pub async fn exchange_code(&self, code: &str) -> ProviderResult<TokenInfo> {
        let params = [
            ("code", code),
            ("client_id", self.config.credentials.client_id.as_str()),
            (
                "client_secret",
                self.config.credentials.client_secret.expose_secret().as_str(),
            ),
            ("redirect_uri", self.config.redirect_url.as_str()),
            ("grant_type", "authorization_code"),
        ];

        debug!(endpoint = %self.config.token_endpoint, "exchanging authorization code");

        let response = self
            .http_client
            .post(&self.config.token_endpoint)
            .form(&params)
            .send()
            .await
            .map_err(|e| {
                ProviderError::from_transport("token exchange request failed", e)
                    .with_provider("oauth")
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            ProviderError::from_transport("failed to read token response", e)
                .with_provider("oauth")
        })?;

        if !status.is_success() {
            let detail = serde_json::from_str::<TokenErrorResponse>(&body)
                .map(|e| e.describe())
                .unwrap_or(body);
            warn!(%status, "token exchange rejected");
            let message = format!("token exchange failed ({}): {}", status, detail);
            let err = if status.is_server_error() {
                ProviderError::server(message)
            } else {
                ProviderError::authentication(message)
            };
            return Err(err.with_provider("oauth"));
        }

        let token_response: TokenResponse = serde_json::from_str(&body).map_err(|e| {
            ProviderError::invalid_response(format!("invalid token response: {}", e))
                .with_provider("oauth")
        })?;

        let token = TokenInfo::from(token_response);
        info!("successfully obtained access token");
        debug!(
            token_type = %token.token_type,
            expires_at = ?token.expires_at,
            scopes = ?token.scopes,
            "granted token"
        );
        Ok(token)
    }
}

impl TokenExchanger for OAuthClient {
    fn authorization_url(&self, state: &str) -> String {
        OAuthClient::authorization_url(self, state)
    }

    fn exchange<'a>(&'a self, code: &'a str) -> BoxFuture<'a, ProviderResult<TokenInfo>> {
        Box::pin(self.exchange_code(code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderErrorCode;
    use crate::google::config::{GOOGLE_AUTH_URL, OAuthCredentials};
    use mockito::Matcher;

    fn test_config() -> OAuthConfig {
        OAuthConfig::google(OAuthCredentials::new(
            "test-client.apps.googleusercontent.com",
            "test-secret",
        ))
    }

    fn client_for(config: OAuthConfig) -> OAuthClient {
        OAuthClient::new(Arc::new(config)).unwrap()
    }

    #[test]
    fn state_is_random() {
        let a = generate_state();
        let b = generate_state();
        assert_ne!(a, b);
        // Base64 encoding of 16 bytes = 22 characters (no padding)
        assert_eq!(a.len(), 22);
    }

    #[test]
    fn auth_url_format() {
        let client = client_for(test_config());
        let url = client.authorization_url("pseudo-random");

        assert!(url.starts_with(GOOGLE_AUTH_URL));
        assert!(url.contains("client_id=test-client.apps.googleusercontent.com"));
        assert!(url.contains(
            "redirect_uri=http%3A%2F%2Flocalhost%3A3000%2FGoogleCallback"
        ));
        assert!(url.contains("response_type=code"));
        assert!(url.contains(
            "scope=https%3A%2F%2Fwww.googleapis.com%2Fauth%2Fdrive%20https%3A%2F%2Fwww.googleapis.com%2Fauth%2Fcalendar"
        ));
        assert!(url.ends_with("&state=pseudo-random"));
    }

    #[test]
    fn auth_url_is_stable_for_same_state() {
        let client = client_for(test_config());
        assert_eq!(
            client.authorization_url("fixed"),
            client.authorization_url("fixed")
        );
    }

    #[test]
    fn auth_url_appends_to_existing_query() {
        let client = client_for(
            test_config().with_auth_endpoint("https://idp.example.com/auth?tenant=a"),
        );
        let url = client.authorization_url("s");
        assert!(url.starts_with("https://idp.example.com/auth?tenant=a&client_id="));
    }

    #[tokio::test]
    async fn exchange_sends_form_and_parses_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/token")
            .match_header("content-type", "application/x-www-form-urlencoded")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("code".into(), "4/auth-code".into()),
                Matcher::UrlEncoded(
                    "client_id".into(),
                    "test-client.apps.googleusercontent.com".into(),
                ),
                Matcher::UrlEncoded("client_secret".into(), "test-secret".into()),
                Matcher::UrlEncoded(
                    "redirect_uri".into(),
                    "http://localhost:3000/GoogleCallback".into(),
                ),
                Matcher::UrlEncoded("grant_type".into(), "authorization_code".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token":"ya29.abc","expires_in":3599,"token_type":"Bearer"}"#)
            .expect(1)
            .create_async()
            .await;

        let client =
            client_for(test_config().with_token_endpoint(format!("{}/token", server.url())));
        let token = client.exchange_code("4/auth-code").await.unwrap();

        assert_eq!(token.secret(), "ya29.abc");
        assert!(token.expires_at.is_some());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn exchange_rejected_code() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/token")
            .with_status(400)
            .with_body(r#"{"error":"invalid_grant","error_description":"Malformed auth code."}"#)
            .expect(1)
            .create_async()
            .await;

        let client =
            client_for(test_config().with_token_endpoint(format!("{}/token", server.url())));
        let err = client.exchange_code("used-code").await.unwrap_err();

        assert_eq!(err.code(), ProviderErrorCode::AuthenticationFailed);
        assert!(err.message().contains("invalid_grant: Malformed auth code."));
        assert_eq!(err.provider(), Some("oauth"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn exchange_server_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/token")
            .with_status(503)
            .with_body("unavailable")
            .create_async()
            .await;

        let client =
            client_for(test_config().with_token_endpoint(format!("{}/token", server.url())));
        let err = client.exchange_code("code").await.unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::ServerError);
        assert!(err.message().contains("unavailable"));
    }

    #[tokio::test]
    async fn exchange_malformed_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/token")
            .with_status(200)
            .with_body("<html>not json</html>")
            .create_async()
            .await;

        let client =
            client_for(test_config().with_token_endpoint(format!("{}/token", server.url())));
        let err = client.exchange_code("code").await.unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::InvalidResponse);
    }

    #[tokio::test]
    async fn exchange_slow_endpoint_times_out() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/token")
            .with_status(200)
            .with_chunked_body(|w| {
                std::thread::sleep(std::time::Duration::from_millis(500));
                w.write_all(br#"{"access_token":"late"}"#)
            })
            .create_async()
            .await;

        let client = client_for(
            test_config()
                .with_token_endpoint(format!("{}/token", server.url()))
                .with_timeout(std::time::Duration::from_millis(50)),
        );
        let err = client.exchange_code("code").await.unwrap_err();

        assert_eq!(err.code(), ProviderErrorCode::Timeout);
        assert_eq!(err.provider(), Some("oauth"));
    }

    #[tokio::test]
    async fn exchange_unreachable_endpoint() {
        // Port 9 (discard) on localhost is not expected to accept connections.
        let client = client_for(test_config().with_token_endpoint("http://127.0.0.1:9/token"));
        let err = client.exchange_code("code").await.unwrap_err();
        assert!(matches!(
            err.code(),
            ProviderErrorCode::NetworkError | ProviderErrorCode::Timeout
        ));
    }
}
