//! HTTP surface for the Google login glance.
//!
//! This crate serves three routes:
//! - `/` - a static page with a login link
//! - `/GoogleLogin` - redirects to Google's consent page with a state token
//! - `/GoogleCallback` - verifies state, exchanges the code, renders the
//!   user's upcoming events and Drive files
//!
//! # Example
//!
//! ```rust,no_run
//! use gglance_server::{FileConfig, Overrides, ServerConfig, serve};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let overrides = Overrides {
//!         client_id: std::env::var("GOOGLE_CLIENT_ID").ok(),
//!         client_secret: std::env::var("GOOGLE_CLIENT_SECRET").ok(),
//!         ..Default::default()
//!     };
//!     let config = ServerConfig::resolve(overrides, FileConfig::load()?)?;
//!     serve(config).await?;
//!     Ok(())
//! }
//! ```

pub mod cli;
mod config;
mod error;
mod routes;
mod signals;
mod state;

use std::sync::Arc;

use gglance_providers::google::{OAuthClient, resource_fetcher};
use tokio::net::TcpListener;
use tracing::info;

pub use config::{DEFAULT_LISTEN, FileConfig, OAuthSettings, Overrides, ServerConfig};
pub use error::{CallbackError, ServerError, ServerResult};
pub use routes::{AppState, CALLBACK_PATH, CallbackParams, router};
pub use signals::shutdown_signal;
pub use state::{STATE_COOKIE, StateGuard, StateMode, StateRejection};

/// Builds the shared state backed by the real Google clients.
pub fn google_app_state(config: &ServerConfig) -> ServerResult<AppState> {
    let oauth = Arc::new(config.oauth.clone());
    let exchanger = OAuthClient::new(oauth)?;
    let fetcher = resource_fetcher(&config.oauth)?;
    Ok(AppState::new(
        Arc::new(exchanger),
        Arc::new(fetcher),
        StateGuard::new(config.state_mode.clone()),
    ))
}

/// Binds the listen address and serves until a shutdown signal arrives.
pub async fn serve(config: ServerConfig) -> ServerResult<()> {
    let state = Arc::new(google_app_state(&config)?);
    let app = router(state);

    let listener = TcpListener::bind(config.listen)
        .await
        .map_err(|source| ServerError::Bind {
            addr: config.listen,
            source,
        })?;

    info!(
        "Server started at http://{} (redirect URL {})",
        config.listen, config.oauth.redirect_url
    );
    if let StateMode::Pinned(_) = config.state_mode {
        tracing::warn!("using a fixed OAuth state token; CSRF protection is weakened");
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}
