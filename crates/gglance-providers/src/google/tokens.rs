//! Access tokens returned by the code exchange.
//!
//! Tokens live for a single callback request and are never written
//! anywhere.

use chrono::{DateTime, Duration, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

/// Information about an OAuth token set.
#[derive(Debug, Clone)]
pub struct TokenInfo {
    /// The bearer credential for API requests.
    pub access_token: SecretString,

    /// Token type, normally `Bearer`.
    pub token_type: String,

    /// When the access token expires.
    pub expires_at: Option<DateTime<Utc>>,

    /// The scopes the provider actually granted.
    pub scopes: Vec<String>,
}

impl TokenInfo {
    /// Creates a bearer token with no expiry or scope information.
    pub fn bearer(access_token: impl Into<String>) -> Self {
        Self {
            access_token: SecretString::new(access_token.into()),
            token_type: "Bearer".to_string(),
            expires_at: None,
            scopes: Vec::new(),
        }
    }

    /// Returns the raw token for an `Authorization` header.
    pub fn secret(&self) -> &str {
        self.access_token.expose_secret()
    }
}

/// Response from the token endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub scope: Option<String>,
}

/// Error body returned by the token endpoint on failure.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenErrorResponse {
    pub error: String,
    #[serde(default)]
    pub error_description: Option<String>,
}

impl TokenErrorResponse {
    /// Formats as `error: description`.
    pub fn describe(&self) -> String {
        match &self.error_description {
            Some(desc) if !desc.is_empty() => format!("{}: {}", self.error, desc),
            _ => self.error.clone(),
        }
    }
}

impl From<TokenResponse> for TokenInfo {
    fn from(response: TokenResponse) -> Self {
        let expires_at = response
            .expires_in
            .map(|secs| Utc::now() + Duration::seconds(secs));

        let scopes = response
            .scope
            .map(|s| s.split_whitespace().map(String::from).collect())
            .unwrap_or_default();

        Self {
            access_token: SecretString::new(response.access_token),
            token_type: response.token_type.unwrap_or_else(|| "Bearer".to_string()),
            expires_at,
            scopes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_from_response() {
        let json = r#"{
            "access_token": "ya29.token",
            "expires_in": 3599,
            "token_type": "Bearer",
            "scope": "https://www.googleapis.com/auth/drive https://www.googleapis.com/auth/calendar",
            "refresh_token": "1//refresh"
        }"#;
        let response: TokenResponse = serde_json::from_str(json).unwrap();
        let token = TokenInfo::from(response);

        assert_eq!(token.secret(), "ya29.token");
        assert_eq!(token.token_type, "Bearer");
        assert_eq!(
            token.scopes,
            vec![
                "https://www.googleapis.com/auth/drive".to_string(),
                "https://www.googleapis.com/auth/calendar".to_string(),
            ]
        );
        assert!(token.expires_at.unwrap() > Utc::now());
    }

    #[test]
    fn minimal_response() {
        let response: TokenResponse =
            serde_json::from_str(r#"{"access_token": "abc"}"#).unwrap();
        let token = TokenInfo::from(response);
        assert_eq!(token.token_type, "Bearer");
        assert!(token.expires_at.is_none());
        assert!(token.scopes.is_empty());
    }

    #[test]
    fn debug_hides_secrets() {
        let token = TokenInfo::bearer("ya29.super-secret");
        assert!(!format!("{:?}", token).contains("super-secret"));
    }

    #[test]
    fn error_response_description() {
        let err: TokenErrorResponse = serde_json::from_str(
            r#"{"error": "invalid_grant", "error_description": "Bad Request"}"#,
        )
        .unwrap();
        assert_eq!(err.describe(), "invalid_grant: Bad Request");

        let err: TokenErrorResponse =
            serde_json::from_str(r#"{"error": "invalid_client"}"#).unwrap();
        assert_eq!(err.describe(), "invalid_client");
    }
}
