//! OAuth configuration holder for the Google login flow.

use std::path::Path;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use url::Url;

/// Google's authorization endpoint.
pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/auth";

/// Google's token endpoint.
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// OAuth 2.0 credentials for Google API access.
#[derive(Debug, Clone)]
pub struct OAuthCredentials {
    /// The OAuth 2.0 client ID from Google Cloud Console.
    pub client_id: String,
    /// The OAuth 2.0 client secret from Google Cloud Console.
    pub client_secret: SecretString,
}

/// Structure of Google's OAuth credentials JSON file.
///
/// Supports multiple formats:
/// 1. Google Cloud Console format with "web" or "installed" section
/// 2. Flat format with client_id and client_secret at root level
#[derive(Debug, Deserialize)]
struct GoogleCredentialsFile {
    web: Option<NestedCredentials>,
    installed: Option<NestedCredentials>,
    client_id: Option<String>,
    client_secret: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NestedCredentials {
    client_id: String,
    client_secret: String,
}

impl OAuthCredentials {
    /// Creates new OAuth credentials.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: SecretString::new(client_secret.into()),
        }
    }

    /// Loads OAuth credentials from a Google Cloud Console JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, String> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| format!("failed to read credentials file: {}", e))?;
        Self::from_json(&content)
    }

    /// Parses OAuth credentials from a Google credentials JSON string.
    ///
    /// Web-application credentials are preferred over installed-app ones
    /// since this flow redirects to a server-side callback.
    pub fn from_json(json: &str) -> Result<Self, String> {
        let file: GoogleCredentialsFile = serde_json::from_str(json)
            .map_err(|e| format!("failed to parse credentials JSON: {}", e))?;

        if let Some(creds) = file.web.or(file.installed) {
            return Ok(Self::new(creds.client_id, creds.client_secret));
        }

        if let (Some(client_id), Some(client_secret)) = (file.client_id, file.client_secret) {
            return Ok(Self::new(client_id, client_secret));
        }

        Err("credentials file must contain 'web'/'installed' section or 'client_id'/'client_secret' at root level".to_string())
    }

    /// Checks that both values are present.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.client_id.trim().is_empty() {
            return Err("client_id is required");
        }
        if self.client_secret.expose_secret().trim().is_empty() {
            return Err("client_secret is required");
        }
        Ok(())
    }
}

/// Configuration for the authorization-code flow.
///
/// Built once at startup and shared read-only afterwards.
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    /// Client credentials.
    pub credentials: OAuthCredentials,

    /// Where the provider sends the browser back after consent.
    pub redirect_url: String,

    /// Requested scopes, in order. Joined with spaces in the auth URL.
    pub scopes: Vec<String>,

    /// The provider's authorization endpoint.
    pub auth_endpoint: String,

    /// The provider's token endpoint.
    pub token_endpoint: String,

    /// Upper bound for the code exchange request.
    pub timeout: Duration,

    /// User agent string for outbound requests.
    pub user_agent: String,
}

impl OAuthConfig {
    /// Default exchange timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

    /// Default redirect URL, matching the default listen address.
    pub const DEFAULT_REDIRECT_URL: &'static str = "http://localhost:3000/GoogleCallback";

    /// Default scopes: full Drive and Calendar access.
    pub const DEFAULT_SCOPES: [&'static str; 2] = [
        "https://www.googleapis.com/auth/drive",
        "https://www.googleapis.com/auth/calendar",
    ];

    /// Creates a configuration for Google with the default redirect URL
    /// and scopes.
    pub fn google(credentials: OAuthCredentials) -> Self {
        Self {
            credentials,
            redirect_url: Self::DEFAULT_REDIRECT_URL.to_string(),
            scopes: Self::DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect(),
            auth_endpoint: GOOGLE_AUTH_URL.to_string(),
            token_endpoint: GOOGLE_TOKEN_URL.to_string(),
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            user_agent: format!("gglance/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Sets the redirect URL.
    pub fn with_redirect_url(mut self, url: impl Into<String>) -> Self {
        self.redirect_url = url.into();
        self
    }

    /// Sets the OAuth scopes.
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Sets the authorization endpoint.
    pub fn with_auth_endpoint(mut self, url: impl Into<String>) -> Self {
        self.auth_endpoint = url.into();
        self
    }

    /// Sets the token endpoint.
    pub fn with_token_endpoint(mut self, url: impl Into<String>) -> Self {
        self.token_endpoint = url.into();
        self
    }

    /// Sets the exchange timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the space-joined scope string sent to the provider.
    pub fn scope_string(&self) -> String {
        self.scopes.join(" ")
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        self.credentials
            .validate()
            .map_err(|e| format!("invalid credentials: {}", e))?;

        if self.scopes.is_empty() || self.scopes.iter().any(|s| s.trim().is_empty()) {
            return Err("at least one non-empty OAuth scope is required".to_string());
        }

        for (name, value) in [
            ("redirect_url", &self.redirect_url),
            ("auth_endpoint", &self.auth_endpoint),
            ("token_endpoint", &self.token_endpoint),
        ] {
            Url::parse(value).map_err(|e| format!("invalid {}: {} ({})", name, value, e))?;
        }

        if self.timeout.is_zero() {
            return Err("exchange timeout must be greater than zero".to_string());
        }

        Ok(())
    }
}
