use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use haulgeo_amap::AmapClient;
use haulgeo_core::{AppConfig, Environment};
use haulgeo_engine::{GeoEngine, GeocodeProvider};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "haulgeo-cli")]
#[command(about = "Geocoding and route resolution for freight waypoints")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Resolve an address through the strategy cascade
    Geocode {
        address: String,
        /// City to scope the provider search to
        #[arg(long)]
        city: Option<String>,
    },
    /// Resolve a colloquial or incomplete address
    Fuzzy {
        address: String,
        #[arg(long)]
        city: Option<String>,
    },
    /// Resolve a coordinate to a structured address
    Reverse {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
    },
    /// Resolve many addresses independently
    Batch {
        addresses: Vec<String>,
        /// File with one address per line
        #[arg(long)]
        file: Option<PathBuf>,
        #[arg(long)]
        city: Option<String>,
    },
    /// Build a display path through cached waypoints (requires `DATABASE_URL`)
    Route {
        #[arg(required = true, num_args = 2..)]
        waypoints: Vec<String>,
    },
}

/// Colour codes are disabled in production.
fn ansi_logs(env: &Environment) -> bool {
    !matches!(env, Environment::Production)
}

/// Geocoding engine over the shared client. Routing is attached per command.
fn build_engine(amap: &Arc<AmapClient>, config: &AppConfig) -> GeoEngine {
    let geocoder: Arc<dyn GeocodeProvider> = amap.clone();
    GeoEngine::from_app_config(geocoder, config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = haulgeo_core::load_app_config()?;

    // Logs go to stderr so stdout stays machine-readable.
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(ansi_logs(&config.env))
        .init();
    tracing::debug!(env = %config.env, "configuration loaded");

    let amap = Arc::new(AmapClient::from_app_config(&config)?);
    let engine = build_engine(&amap, &config);

    match cli.command {
        Commands::Geocode { address, city } => {
            commands::run_geocode(&engine, &address, city.as_deref()).await
        }
        Commands::Fuzzy { address, city } => {
            commands::run_fuzzy(&engine, &address, city.as_deref()).await
        }
        Commands::Reverse { lat, lon } => commands::run_reverse(&engine, lat, lon).await,
        Commands::Batch {
            addresses,
            file,
            city,
        } => {
            let addresses = commands::collect_batch_inputs(addresses, file.as_deref())?;
            commands::run_batch(&engine, &addresses, city.as_deref()).await
        }
        Commands::Route { waypoints } => {
            let pool = haulgeo_db::connect_pool_from_config(&config).await?;
            let engine = engine.with_routing(
                Arc::new(haulgeo_db::PgLocationCache::new(pool)),
                amap,
                haulgeo_engine::RouteOptions::from_app_config(&config),
            );
            commands::run_route(&engine, &waypoints).await
        }
    }
}
