//! Server configuration.
//!
//! Settings are merged from three layers, highest priority first:
//! 1. command-line flags and their environment variables
//! 2. an optional `config.toml` (default `~/.config/gglance/config.toml`)
//! 3. built-in defaults
//!
//! Client secrets are only read from flags, the environment, or a Google
//! credentials JSON file, never from `config.toml`.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use gglance_core::TracingOutputFormat;
use gglance_providers::google::{OAuthConfig, OAuthCredentials};
use serde::Deserialize;

use crate::error::{ServerError, ServerResult};
use crate::state::StateMode;

/// Default listen address.
pub const DEFAULT_LISTEN: &str = "127.0.0.1:3000";

/// Contents of `config.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Address to listen on.
    pub listen: Option<SocketAddr>,
    /// Log output format: pretty, compact or json.
    pub log_format: Option<String>,
    /// Filter directive used instead of the default, e.g. `gglance=debug`.
    pub log_filter: Option<String>,
    /// OAuth settings.
    pub oauth: OAuthSettings,
}

/// `[oauth]` section of `config.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OAuthSettings {
    /// OAuth client ID.
    pub client_id: Option<String>,
    /// Path to a Google Cloud Console credentials JSON file.
    pub credentials_file: Option<PathBuf>,
    /// Redirect URL registered with the provider.
    pub redirect_url: Option<String>,
    /// Requested scopes.
    pub scopes: Option<Vec<String>>,
    /// Authorization endpoint override.
    pub auth_endpoint: Option<String>,
    /// Token endpoint override.
    pub token_endpoint: Option<String>,
    /// Upper bound for outbound requests, in seconds.
    pub timeout_secs: Option<u64>,
    /// Lifetime of per-session state tokens, in seconds.
    pub state_ttl_secs: Option<u64>,
}

impl FileConfig {
    /// Loads configuration from the default path, if the file exists.
    pub fn load() -> ServerResult<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> ServerResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ServerError::config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
            .map_err(|e| ServerError::config(format!("{} in {}", e, path.display())))
    }

    /// Parses configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| format!("failed to parse config: {}", e))
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gglance")
            .join("config.toml")
    }
}

/// Values supplied on the command line or through the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub listen: Option<SocketAddr>,
    pub log_format: Option<String>,
    pub redirect_url: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub credentials_file: Option<PathBuf>,
    pub fixed_state: Option<String>,
}

/// Fully resolved server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on.
    pub listen: SocketAddr,
    /// OAuth settings, validated.
    pub oauth: OAuthConfig,
    /// State token strategy.
    pub state_mode: StateMode,
    /// Log output format, when set explicitly.
    pub log_format: Option<TracingOutputFormat>,
    /// Filter directive from the config file.
    pub log_filter: Option<String>,
}

impl ServerConfig {
    /// Merges overrides over the file configuration and validates the
    /// result.
    ///
    /// # Errors
    ///
    /// Fails when client credentials are missing or empty, or any value
    /// is malformed. The server must not start in that case.
    pub fn resolve(overrides: Overrides, file: FileConfig) -> ServerResult<Self> {
        let listen = match overrides.listen.or(file.listen) {
            Some(addr) => addr,
            None => DEFAULT_LISTEN
                .parse()
                .map_err(|e| ServerError::config(format!("invalid default listen address: {}", e)))?,
        };

        let log_format = overrides
            .log_format
            .or(file.log_format)
            .map(|name| name.parse::<TracingOutputFormat>())
            .transpose()
            .map_err(|e| ServerError::config(e.to_string()))?;

        let log_filter = file.log_filter;
        let settings = file.oauth;
        let credentials = resolve_credentials(
            overrides.client_id.or(settings.client_id),
            overrides.client_secret,
            overrides.credentials_file.or(settings.credentials_file),
        )?;

        let mut oauth = OAuthConfig::google(credentials);
        if let Some(url) = overrides.redirect_url.or(settings.redirect_url) {
            oauth = oauth.with_redirect_url(url);
        }
        if let Some(scopes) = settings.scopes {
            oauth = oauth.with_scopes(scopes);
        }
        if let Some(url) = settings.auth_endpoint {
            oauth = oauth.with_auth_endpoint(url);
        }
        if let Some(url) = settings.token_endpoint {
            oauth = oauth.with_token_endpoint(url);
        }
        if let Some(secs) = settings.timeout_secs {
            oauth = oauth.with_timeout(Duration::from_secs(secs));
        }
        oauth.validate().map_err(ServerError::config)?;

        let state_mode = match overrides.fixed_state {
            Some(value) if value.is_empty() => {
                return Err(ServerError::config("fixed state token must not be empty"));
            }
            Some(value) => StateMode::Pinned(value),
            None => StateMode::PerSession {
                ttl: settings
                    .state_ttl_secs
                    .map(Duration::from_secs)
                    .unwrap_or(StateMode::DEFAULT_TTL),
            },
        };

        Ok(Self {
            listen,
            oauth,
            state_mode,
            log_format,
            log_filter,
        })
    }
}

fn resolve_credentials(
    client_id: Option<String>,
    client_secret: Option<String>,
    credentials_file: Option<PathBuf>,
) -> ServerResult<OAuthCredentials> {
    match (client_id, client_secret, credentials_file) {
        (Some(id), Some(secret), _) => Ok(OAuthCredentials::new(id, secret)),
        (_, _, Some(path)) => OAuthCredentials::from_file(&path).map_err(ServerError::config),
        _ => Err(ServerError::config(
            "missing Google client credentials: set GOOGLE_CLIENT_ID and GOOGLE_CLIENT_SECRET, \
             or GOOGLE_CREDENTIALS_FILE",
        )),
    }
}
