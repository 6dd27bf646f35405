//! gglance server entry point.

use std::process::ExitCode;

use clap::Parser;
use gglance_core::{TracingConfig, init_tracing};
use gglance_server::cli::Cli;
use gglance_server::{FileConfig, ServerConfig, ServerResult, serve};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ServerResult<()> {
    let file = match cli.config {
        Some(ref path) => FileConfig::load_from(path)?,
        None => FileConfig::load()?,
    };

    // Refuse to start without usable credentials.
    let config = ServerConfig::resolve(cli.overrides(), file)?;

    let mut tracing_config = if cli.debug {
        TracingConfig::debug()
    } else {
        TracingConfig::server()
    };
    if let Some(format) = config.log_format {
        tracing_config = tracing_config.with_format(format);
    }
    if let Some(ref filter) = config.log_filter {
        tracing_config = tracing_config.with_env_filter(filter.as_str());
    }
    init_tracing(tracing_config)?;

    serve(config).await
}
