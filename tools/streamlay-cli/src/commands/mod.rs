//! Subcommand definitions and shared command context.

use std::sync::Arc;

use clap::{Args, Subcommand};
use streamlay_common::AppConfig;
use streamlay_stream_session::HeadlessSurface;
use streamlay_store_client::HttpStore;
use streamlay_studio::Studio;

pub mod compose;
pub mod config;
pub mod health;
pub mod overlays;
pub mod settings;
pub mod stream;

/// Configuration and API client shared by every command.
pub struct Context {
    pub config: AppConfig,
    pub store: Arc<HttpStore>,
}

impl Context {
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let store = HttpStore::from_config(&config.api)?;
        tracing::debug!(base_url = %store.base_url(), "Using API");
        Ok(Self {
            config,
            store: Arc::new(store),
        })
    }

    /// A studio on a headless surface of the given size.
    pub fn studio(&self, width: u32, height: u32) -> Studio {
        Studio::new(self.store.clone(), Box::new(HeadlessSurface::new(width, height)))
    }
}

#[derive(Subcommand)]
pub enum OverlayCommand {
    /// List every overlay
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a single overlay
    Show {
        /// Overlay id
        id: String,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create a new overlay
    Create(OverlayArgs),

    /// Change fields of an existing overlay
    Update {
        /// Overlay id
        id: String,

        #[command(flatten)]
        fields: OverlayPatch,
    },

    /// Delete an overlay
    Delete {
        /// Overlay id
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Fields of a new overlay. Geometry is parsed like form input.
#[derive(Args)]
pub struct OverlayArgs {
    /// Display name
    #[arg(long)]
    pub name: String,

    /// Overlay type: text|image
    #[arg(long = "type", default_value = "text")]
    pub kind: String,

    /// Literal text, or the image URL for image overlays
    #[arg(long)]
    pub content: String,

    /// Horizontal position, percent of surface width
    #[arg(long, default_value = "10", allow_hyphen_values = true)]
    pub x: String,

    /// Vertical position, percent of surface height
    #[arg(long, default_value = "10", allow_hyphen_values = true)]
    pub y: String,

    /// Width in pixels
    #[arg(long, default_value = "100", allow_hyphen_values = true)]
    pub width: String,

    /// Height in pixels
    #[arg(long, default_value = "40", allow_hyphen_values = true)]
    pub height: String,
}

impl OverlayArgs {
    /// Form inputs, keyed by field name.
    pub fn inputs(self) -> Vec<(&'static str, String)> {
        vec![
            ("name", self.name),
            ("type", self.kind),
            ("content", self.content),
            ("position.x", self.x),
            ("position.y", self.y),
            ("size.width", self.width),
            ("size.height", self.height),
        ]
    }
}

/// Fields to change on an existing overlay; omitted ones are kept.
#[derive(Args)]
pub struct OverlayPatch {
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long = "type")]
    pub kind: Option<String>,

    #[arg(long)]
    pub content: Option<String>,

    #[arg(long, allow_hyphen_values = true)]
    pub x: Option<String>,

    #[arg(long, allow_hyphen_values = true)]
    pub y: Option<String>,

    #[arg(long, allow_hyphen_values = true)]
    pub width: Option<String>,

    #[arg(long, allow_hyphen_values = true)]
    pub height: Option<String>,
}

impl OverlayPatch {
    pub fn inputs(self) -> Vec<(&'static str, String)> {
        [
            ("name", self.name),
            ("type", self.kind),
            ("content", self.content),
            ("position.x", self.x),
            ("position.y", self.y),
            ("size.width", self.width),
            ("size.height", self.height),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.map(|v| (field, v)))
        .collect()
    }
}

#[derive(Subcommand)]
pub enum SettingsCommand {
    /// Print the saved stream URL
    Get,

    /// Save a stream URL
    Set {
        /// RTSP URL
        url: String,
    },

    /// Remove the saved stream URL
    Clear,
}

#[derive(Subcommand)]
pub enum StreamCommand {
    /// Ask the server to start ingesting a stream
    Start {
        /// RTSP URL (defaults to the saved one)
        url: Option<String>,
    },

    /// Ask the server to stop the current stream
    Stop,

    /// Show the server-side stream status
    Status {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration and where it is read from
    Show,

    /// Write the file configuration (or defaults) to the config file, without -v or --api-url
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
