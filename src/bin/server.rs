//! drift-world-server binary
//!
//! Starts the session host and serves the wire protocol over TCP.
//!
//! ## Configuration (flags / env / TOML via `config` crate)
//!
//! | Key                  | Default          | Description                       |
//! |----------------------|------------------|-----------------------------------|
//! | `WORLD_BIND`         | `0.0.0.0:4000`   | Listen address                    |
//! | `WORLD_CHUNK_SIZE`   | `1000.0`         | Streaming chunk size (world units)|
//! | `WORLD_CONFIG`       | *(unset)*        | Optional TOML settings file       |
//!
//! The TOML file (when given) may set any `WorldConfig` field; command-line
//! flags override it.

use anyhow::{Context, Result};
use clap::Parser;
use drift_world::types::WorldConfig;

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(name = "drift-world-server", about = "Drift World session host", version)]
struct Args {
    /// Listen address
    #[arg(long, env = "WORLD_BIND", default_value = "0.0.0.0:4000")]
    bind: String,

    /// Streaming chunk size in world units
    #[arg(long, env = "WORLD_CHUNK_SIZE")]
    chunk_size: Option<f32>,

    /// Optional TOML settings file
    #[arg(long, env = "WORLD_CONFIG")]
    config: Option<std::path::PathBuf>,
}

impl Args {
    /// Defaults, overlaid with the TOML file, overlaid with flags.
    fn world_config(&self) -> Result<WorldConfig> {
        let mut builder = config::Config::builder()
            .add_source(config::Config::try_from(&WorldConfig::default())?);
        if let Some(path) = &self.config {
            builder = builder.add_source(config::File::from(path.as_path()));
        }
        let mut world: WorldConfig = builder
            .build()
            .context("failed to load settings")?
            .try_deserialize()
            .context("invalid settings file")?;

        if let Some(chunk_size) = self.chunk_size {
            world.chunk_size = chunk_size;
        }
        Ok(world)
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("drift_world=debug".parse()?),
        )
        .init();

    let args = Args::parse();
    let world = args.world_config()?;

    log::info!(
        "Starting drift-world-server (bind='{}', chunk_size={}, spawn=({}, {}))",
        args.bind,
        world.chunk_size,
        world.spawn_x,
        world.spawn_y,
    );

    drift_world::net::serve(&args.bind, world).await
}
