use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use prop_trends::api::state::AppState;
use prop_trends::config::{
    parse_buffer_list, AppConfig, DirectionFilter, LineAdjustment, LineMethod, StatSelector,
    TrendFilterConfig,
};
use prop_trends::engine::TrendEngine;
use prop_trends::loader::{RestLoader, SnapshotLoader};
use prop_trends::models::{PredictionModel, StatType};

#[derive(Parser)]
#[command(name = "prop-trends")]
#[command(about = "Player prop trend detection and line calculation")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        /// Override the configured bind address
        #[arg(long)]
        host: Option<String>,

        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Run one trend query against a snapshot file and print the results
    Scan {
        /// Path to a JSON snapshot
        snapshot: String,

        /// Stat to evaluate (e.g. "points"); default all
        #[arg(long)]
        stat: Option<String>,

        /// Direction: "over", "under" or "both"
        #[arg(long, default_value = "both")]
        direction: String,

        /// Minimum streak length
        #[arg(long, default_value = "3")]
        min_streak: usize,

        /// Line method: "player-average" or "ai-prediction"
        #[arg(long, default_value = "player-average")]
        line_method: String,

        /// Line adjustment: "standard", "favorable" or "custom"
        #[arg(long, default_value = "standard")]
        line_adjustment: String,

        /// Comma-separated "stat:buffer" pairs for custom adjustment
        /// (e.g. "points:2.5,assists:1.0")
        #[arg(long)]
        buffers: Option<String>,

        /// Keep only trends the ensemble prediction agrees with
        #[arg(long)]
        require_ai_agreement: bool,

        /// Filter by player name (substring)
        #[arg(long)]
        player: Option<String>,

        /// Filter by team abbreviation
        #[arg(long)]
        team: Option<String>,

        /// Filter by opponent abbreviation
        #[arg(long)]
        opponent: Option<String>,

        /// Comma-separated model names; default all
        #[arg(long)]
        models: Option<String>,

        /// Print results as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting prop-trends v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Serve { host, port } => {
            let config = AppConfig::load(&cli.config)
                .with_context(|| format!("Failed to load config from {}", cli.config))?;

            let loader = RestLoader::new(&config.store)?;
            let state = AppState {
                loader: Arc::new(loader),
                limits: config.limits,
            };
            let app = prop_trends::api::build_router(state);

            let host = host.unwrap_or(config.server.host);
            let port = port.unwrap_or(config.server.port);
            let addr = format!("{}:{}", host, port);
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!("Listening on http://{}", addr);
            axum::serve(listener, app).await?;
        }
        Commands::Scan {
            snapshot,
            stat,
            direction,
            min_streak,
            line_method,
            line_adjustment,
            buffers,
            require_ai_agreement,
            player,
            team,
            opponent,
            models,
            json,
        } => {
            let stats = match stat.as_deref() {
                None => StatSelector::All,
                Some(name) => match StatType::parse(name) {
                    Some(stat) => StatSelector::Single(stat),
                    None => bail!("Unknown stat: {}", name),
                },
            };
            let direction = match direction.as_str() {
                "over" => DirectionFilter::Over,
                "under" => DirectionFilter::Under,
                "both" => DirectionFilter::Both,
                other => bail!("Unknown direction: {}", other),
            };
            let line_method = match line_method.as_str() {
                "player-average" => LineMethod::PlayerAverage,
                "ai-prediction" => LineMethod::AiPrediction,
                other => bail!("Unknown line method: {}", other),
            };
            let line_adjustment = match line_adjustment.as_str() {
                "standard" => LineAdjustment::Standard,
                "favorable" => LineAdjustment::Favorable,
                "custom" => LineAdjustment::Custom,
                other => bail!("Unknown line adjustment: {}", other),
            };
            let custom_buffers = match buffers {
                None => Default::default(),
                Some(pairs) => match parse_buffer_list(&pairs) {
                    Ok(buffers) => buffers,
                    Err(message) => bail!("{}", message),
                },
            };
            let models: Vec<PredictionModel> = match models {
                None => PredictionModel::ALL.to_vec(),
                Some(names) => names
                    .split(',')
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .map(|n| {
                        PredictionModel::parse(n)
                            .ok_or_else(|| anyhow::anyhow!("Unknown model: {}", n))
                    })
                    .collect::<Result<_>>()?,
            };

            let config = TrendFilterConfig {
                stats,
                direction,
                min_streak,
                line_method,
                line_adjustment,
                custom_buffers,
                require_ai_agreement,
                player_name: player,
                team,
                opponent,
                ..Default::default()
            };

            let loader = SnapshotLoader::from_path(&snapshot)
                .with_context(|| format!("Failed to load snapshot from {}", snapshot))?;
            let engine = TrendEngine::new(Arc::new(loader));
            let trends = engine.find_trends(&config, &models).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&trends)?);
                return Ok(());
            }

            if trends.is_empty() {
                println!("No qualifying trends.");
                return Ok(());
            }

            println!("=== {} Trends ===\n", trends.len());
            for (i, t) in trends.iter().enumerate() {
                println!(
                    "{:>3}. {} ({} vs {}) | {} {} {} | {} | avg {:.1}, pred {:.1} | score {:.1}",
                    i + 1,
                    t.player_name,
                    t.team,
                    t.opponent,
                    t.direction.label_word(),
                    t.line,
                    t.stat,
                    t.label,
                    t.season_avg,
                    t.predicted_value,
                    t.score,
                );
            }
        }
    }

    Ok(())
}
