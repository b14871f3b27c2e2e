//! TileProxy CLI - runs the XYZ→WMS tile proxy server.
//!
//! Configuration comes from the environment (including a `.env` file in
//! the working directory), with command-line flags taking precedence.

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use tileproxy::app::{ProxyConfig, TileProxyApp};

#[derive(Parser, Debug)]
#[command(name = "tileproxy")]
#[command(about = "XYZ tile proxy in front of a WMS map server")]
#[command(version)]
struct Args {
    /// Listen address (overrides BIND_ADDR)
    #[arg(short, long)]
    bind: Option<String>,

    /// Upstream WMS endpoint URL (overrides GEOSERVER_URL)
    #[arg(short, long)]
    upstream: Option<String>,

    /// Cache capacity in tiles (overrides CACHE_SIZE)
    #[arg(long)]
    cache_size: Option<usize>,

    /// Tile edge length in pixels (overrides TILE_SIZE)
    #[arg(long)]
    tile_size: Option<u32>,

    /// Deepest zoom level served (overrides MAX_ZOOM)
    #[arg(long)]
    max_zoom: Option<u8>,
}

fn build_config(args: Args) -> Result<ProxyConfig, tileproxy::app::AppError> {
    let mut config = ProxyConfig::from_env()?;

    if let Some(bind) = args.bind {
        config = config.with_bind_addr(bind);
    }
    if let Some(upstream) = args.upstream {
        config = config.with_upstream_url(upstream);
    }
    if let Some(capacity) = args.cache_size {
        config = config.with_cache_capacity(capacity);
    }
    if let Some(size) = args.tile_size {
        config = config.with_tile_size(size);
    }
    if let Some(zoom) = args.max_zoom {
        config = config.with_max_zoom(zoom);
    }

    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();

    let config = match build_config(args) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return std::process::ExitCode::FAILURE;
        }
    };

    let app = match TileProxyApp::new(config) {
        Ok(app) => app,
        Err(e) => {
            error!(error = %e, "Failed to start tile proxy");
            return std::process::ExitCode::FAILURE;
        }
    };

    if let Err(e) = app.serve().await {
        error!(error = %e, "Server exited with error");
        return std::process::ExitCode::FAILURE;
    }

    std::process::ExitCode::SUCCESS
}
