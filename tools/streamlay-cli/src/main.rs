//! Streamlay CLI: manage overlays and stream settings on a Streamlay API.
//!
//! Usage:
//!   streamlay overlays list             List overlays
//!   streamlay overlays create [OPTIONS] Create an overlay
//!   streamlay settings get|set|clear    Saved stream URL
//!   streamlay stream start|stop|status  Server-side stream control
//!   streamlay health                    API liveness
//!   streamlay compose [OPTIONS]         Preview the composited scene
//!   streamlay config show|init          Local configuration file

use clap::{Parser, Subcommand};
use streamlay_common::AppConfig;

mod commands;

use commands::{ConfigCommand, OverlayCommand, SettingsCommand, StreamCommand};

#[derive(Parser)]
#[command(
    name = "streamlay",
    about = "RTSP stream viewer with positioned text and image overlays",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// API base URL (overrides the config file)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create, inspect, edit and delete overlays
    Overlays {
        #[command(subcommand)]
        command: OverlayCommand,
    },

    /// Read or change the saved stream URL
    Settings {
        #[command(subcommand)]
        command: SettingsCommand,
    },

    /// Control server-side stream ingest
    Stream {
        #[command(subcommand)]
        command: StreamCommand,
    },

    /// Check that the API is reachable
    Health,

    /// Compose the saved overlays over a surface and print the placements
    Compose {
        /// Stream URL to preview (defaults to the saved one)
        #[arg(long)]
        url: Option<String>,

        /// Surface width in pixels
        #[arg(long)]
        width: Option<u32>,

        /// Surface height in pixels
        #[arg(long)]
        height: Option<u32>,

        /// Print the view as JSON
        #[arg(long)]
        json: bool,
    },

    /// Inspect or create the local configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Apply command-line flags on top of the file configuration.
fn with_overrides(file: &AppConfig, verbose: bool, api_url: Option<&str>) -> AppConfig {
    let mut config = file.clone();
    if verbose {
        config.logging.level = "debug".to_string();
    }
    if let Some(url) = api_url {
        config.api.base_url = url.to_string();
    }
    config
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let file_config = AppConfig::load();
    let config = with_overrides(&file_config, cli.verbose, cli.api_url.as_deref());
    streamlay_common::logging::init_logging(&config.logging);
    let ctx = commands::Context::new(config)?;

    match cli.command {
        Commands::Overlays { command } => match command {
            OverlayCommand::List { json } => commands::overlays::list(&ctx, json).await,
            OverlayCommand::Show { id, json } => commands::overlays::show(&ctx, id, json).await,
            OverlayCommand::Create(args) => commands::overlays::create(&ctx, args).await,
            OverlayCommand::Update { id, fields } => {
                commands::overlays::update(&ctx, id, fields).await
            }
            OverlayCommand::Delete { id, yes } => commands::overlays::delete(&ctx, id, yes).await,
        },
        Commands::Settings { command } => match command {
            SettingsCommand::Get => commands::settings::get(&ctx).await,
            SettingsCommand::Set { url } => commands::settings::set(&ctx, url).await,
            SettingsCommand::Clear => commands::settings::clear(&ctx).await,
        },
        Commands::Stream { command } => match command {
            StreamCommand::Start { url } => commands::stream::start(&ctx, url).await,
            StreamCommand::Stop => commands::stream::stop(&ctx).await,
            StreamCommand::Status { json } => commands::stream::status(&ctx, json).await,
        },
        Commands::Health => commands::health::run(&ctx).await,
        Commands::Compose {
            url,
            width,
            height,
            json,
        } => commands::compose::run(&ctx, url, width, height, json).await,
        Commands::Config { command } => match command {
            ConfigCommand::Show => commands::config::show(&ctx),
            ConfigCommand::Init { force } => commands::config::init(&file_config, force),
        },
    }
}
