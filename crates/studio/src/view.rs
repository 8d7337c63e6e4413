//! What a frontend draws for the current studio state.

use serde::Serialize;
use streamlay_render_engine::Scene;
use streamlay_stream_session::PlaybackState;

/// The stream info panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreamInfo {
    /// Configured URL, possibly empty.
    pub url: String,
    /// Source loaded on the surface.
    pub active_source: Option<String>,
    pub state: PlaybackState,
    pub status: &'static str,
    pub error: Option<String>,
    pub volume: f32,
}

/// A full frame: video info, composited overlays, and the overlay list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudioView {
    pub stream: StreamInfo,
    /// Empty while no source is active.
    pub scene: Scene,
    /// One line per overlay, in list order.
    pub summaries: Vec<String>,
}
