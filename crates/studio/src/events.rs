//! Change notifications, fanned out over a `tokio::sync::broadcast` channel.

use chrono::{DateTime, Utc};
use serde::Serialize;
use streamlay_overlay_model::OverlayId;
use streamlay_stream_session::PlaybackState;
use tokio::sync::broadcast;

/// Severity of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

/// A message for the user, e.g. "Overlay created successfully".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    /// When the notice was raised (UTC).
    pub at: DateTime<Utc>,
}

impl Notice {
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            at: Utc::now(),
        }
    }
}

/// Something observable changed in the studio.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum StudioEvent {
    /// The overlay list was replaced by a fresh server snapshot.
    OverlaysReloaded { count: usize },
    /// Form mode, contents, or visibility changed.
    FormChanged {
        editing: Option<OverlayId>,
        visible: bool,
    },
    /// Playback state or its error message changed.
    PlaybackChanged {
        state: PlaybackState,
        error: Option<String>,
    },
    /// The configured stream URL changed.
    StreamUrlChanged { url: String },
    /// An image overlay's resource failed to load and is now hidden.
    OverlayImageFailed { id: OverlayId },
    /// Player volume after clamping.
    VolumeChanged { volume: f32 },
    Notice(Notice),
}

const DEFAULT_CAPACITY: usize = 256;

/// In-process fan-out bus for [`StudioEvent`]s.
///
/// Slow receivers that fall more than the channel capacity behind observe
/// `RecvError::Lagged` and should redraw from current state.
pub struct EventBus {
    sender: broadcast::Sender<StudioEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish to every current subscriber. Dropped when nobody listens.
    pub fn publish(&self, event: StudioEvent) {
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StudioEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
