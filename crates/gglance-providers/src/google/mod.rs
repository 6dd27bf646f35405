//! Google implementation of the login flow and resource fetchers.
//!
//! # Authentication Flow
//!
//! 1. The operator provides an OAuth client ID/secret (web application type)
//! 2. `/GoogleLogin` redirects the browser to Google's consent page
//! 3. Google redirects back to `/GoogleCallback` with `code` and `state`
//! 4. [`OAuthClient`] exchanges the code for an access token
//! 5. [`GoogleCalendarClient`] and [`GoogleDriveClient`] read data with it
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use gglance_providers::google::{OAuthClient, OAuthConfig, OAuthCredentials, resource_fetcher};
//!
//! let config = Arc::new(OAuthConfig::google(OAuthCredentials::new(id, secret)));
//! let oauth = OAuthClient::new(config.clone())?;
//! let fetcher = resource_fetcher(&config)?;
//!
//! let token = oauth.exchange_code(&code).await?;
//! let snapshot = fetcher.fetch_resources(&token).await?;
//! ```

mod calendar;
mod config;
mod drive;
mod http;
mod oauth;
mod tokens;

use std::sync::Arc;

pub use calendar::{CALENDAR_API_BASE, GoogleCalendarClient};
pub use config::{GOOGLE_AUTH_URL, GOOGLE_TOKEN_URL, OAuthConfig, OAuthCredentials};
pub use drive::{DRIVE_API_BASE, GoogleDriveClient};
pub use oauth::{OAuthClient, generate_state};
pub use tokens::TokenInfo;

use crate::error::ProviderResult;
use crate::provider::ComposedFetcher;

/// Builds the calendar + drive fetcher used after login.
///
/// Both clients share the exchange timeout and user agent from `config`.
pub fn resource_fetcher(config: &OAuthConfig) -> ProviderResult<ComposedFetcher> {
    let calendar = GoogleCalendarClient::new(config.timeout, &config.user_agent)?;
    let drive = GoogleDriveClient::new(config.timeout, &config.user_agent)?;
    Ok(ComposedFetcher::new(Arc::new(calendar), Arc::new(drive)))
}
