//! Command-line interface definition.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

use crate::config::Overrides;

/// gglance - sign in with Google, glance at your calendar and Drive
#[derive(Debug, Parser)]
#[command(name = "gglance")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "GGLANCE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,

    /// Log format: pretty, compact or json
    #[arg(long, env = "GGLANCE_LOG_FORMAT")]
    pub log_format: Option<String>,

    /// Address to listen on
    #[arg(long, short, env = "GGLANCE_LISTEN")]
    pub listen: Option<SocketAddr>,

    /// Redirect URL registered with Google
    #[arg(long, env = "GGLANCE_REDIRECT_URL")]
    pub redirect_url: Option<String>,

    /// OAuth client ID (from Google Cloud Console)
    #[arg(long, env = "GOOGLE_CLIENT_ID")]
    pub client_id: Option<String>,

    /// OAuth client secret (from Google Cloud Console)
    #[arg(long, env = "GOOGLE_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,

    /// Path to Google Cloud Console credentials JSON file
    ///
    /// Alternative to providing client_id and client_secret separately.
    #[arg(long, env = "GOOGLE_CREDENTIALS_FILE")]
    pub credentials_file: Option<PathBuf>,

    /// Use this fixed state token instead of a random one per login
    ///
    /// Weakens CSRF protection; meant for local testing.
    #[arg(long, env = "GGLANCE_FIXED_STATE", hide_env_values = true)]
    pub fixed_state: Option<String>,
}

impl Cli {
    /// Returns the values that override the configuration file.
    pub fn overrides(&self) -> Overrides {
        Overrides {
            listen: self.listen,
            log_format: self.log_format.clone(),
            redirect_url: self.redirect_url.clone(),
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            credentials_file: self.credentials_file.clone(),
            fixed_state: self.fixed_state.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_flags() {
        let cli = Cli::try_parse_from([
            "gglance",
            "--listen",
            "0.0.0.0:3000",
            "--client-id",
            "id",
            "--client-secret",
            "secret",
            "--fixed-state",
            "pseudo-random",
            "-v",
        ])
        .unwrap();

        assert!(cli.debug);
        let overrides = cli.overrides();
        assert_eq!(overrides.listen.unwrap().to_string(), "0.0.0.0:3000");
        assert_eq!(overrides.client_id.as_deref(), Some("id"));
        assert_eq!(overrides.fixed_state.as_deref(), Some("pseudo-random"));
    }

    #[test]
    fn rejects_bad_listen_address() {
        assert!(Cli::try_parse_from(["gglance", "--listen", "nope"]).is_err());
    }
}
