mod auth_commands;
mod bridge;
mod compress_commands;
mod config_commands;

use std::path::PathBuf;

use {
    clap::{Parser, Subcommand},
    pdfsqueeze_config::PdfsqueezeConfig,
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(
    name = "pdfsqueeze",
    about = "Shrink PDFs shared with a Slack bot and post a Drive link back"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file (default: ./pdfsqueeze.toml, then ~/.config/pdfsqueeze/).
    #[arg(long, global = true, env = "PDFSQUEEZE_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect to Slack and serve mentions (default when no subcommand is
    /// provided).
    Run,
    /// Google Drive authorization.
    Auth {
        #[command(subcommand)]
        action: auth_commands::AuthAction,
    },
    /// Configuration inspection.
    Config {
        #[command(subcommand)]
        action: config_commands::ConfigAction,
    },
    /// Compress a local PDF with the bot's Ghostscript profile.
    Compress(compress_commands::CompressArgs),
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

/// Config as loaded for this invocation, plus the file it came from.
pub(crate) struct LoadedConfig {
    pub config: PdfsqueezeConfig,
    pub path: Option<PathBuf>,
}

/// An explicit `--config` must load; discovered files fall back to defaults
/// with a warning. Env overrides apply either way.
fn load_config(explicit: Option<PathBuf>) -> anyhow::Result<LoadedConfig> {
    let (config, path) = match explicit {
        Some(path) => (pdfsqueeze_config::load_config(&path)?, Some(path)),
        None => (
            pdfsqueeze_config::discover_and_load(),
            pdfsqueeze_config::find_config_file(),
        ),
    };
    Ok(LoadedConfig {
        config: pdfsqueeze_config::apply_env_overrides(config),
        path,
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "pdfsqueeze starting");
    let loaded = load_config(cli.config)?;

    match cli.command {
        None | Some(Commands::Run) => bridge::run(loaded).await,
        Some(Commands::Auth { action }) => auth_commands::handle_auth(action, &loaded.config).await,
        Some(Commands::Config { action }) => config_commands::handle_config(action, &loaded),
        Some(Commands::Compress(args)) => compress_commands::compress(args, &loaded.config).await,
    }
}
