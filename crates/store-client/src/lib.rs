//! Streamlay Store Client
//!
//! The boundary between Streamlay and the remote overlay/stream API.
//! Every operation is a single round trip with no retries; failures come
//! back as [`StreamlayError`](streamlay_common::StreamlayError) values that
//! keep the original cause.
//!
//! ```text
//! OverlayForm / Studio
//!         │
//!         ▼
//!   dyn OverlayStore ──┬── HttpStore   (reqwest, `/api/...`)
//!                      └── MemoryStore (in-process, tests and demos)
//! ```

pub mod http;
pub mod memory;

pub use http::HttpStore;
pub use memory::{MemoryStore, StoreCall};

use streamlay_common::error::StreamlayResult;
use streamlay_overlay_model::{
    HealthStatus, Overlay, OverlayDraft, OverlayId, StreamSettings, StreamStarted, StreamStatus,
};

/// CRUD gateway for overlays plus the stream endpoints of the same API.
#[async_trait::async_trait]
pub trait OverlayStore: Send + Sync {
    /// All overlays, in the order the server returns them.
    async fn list_overlays(&self) -> StreamlayResult<Vec<Overlay>>;

    /// A single overlay by id.
    async fn get_overlay(&self, id: &OverlayId) -> StreamlayResult<Overlay>;

    /// Persist a new overlay. The server assigns the id.
    async fn create_overlay(&self, draft: &OverlayDraft) -> StreamlayResult<Overlay>;

    /// Replace every editable field of an existing overlay.
    async fn update_overlay(&self, id: &OverlayId, draft: &OverlayDraft)
        -> StreamlayResult<Overlay>;

    /// Remove an overlay. Irreversible.
    async fn delete_overlay(&self, id: &OverlayId) -> StreamlayResult<()>;

    /// The saved stream settings (empty URL when none were saved).
    async fn get_stream_settings(&self) -> StreamlayResult<StreamSettings>;

    /// Overwrite the saved stream settings.
    async fn save_stream_settings(&self, settings: &StreamSettings)
        -> StreamlayResult<StreamSettings>;

    /// Ask the server to start ingesting `rtsp_url`.
    async fn start_stream(&self, rtsp_url: &str) -> StreamlayResult<StreamStarted>;

    /// Ask the server to stop the current ingest.
    async fn stop_stream(&self) -> StreamlayResult<()>;

    /// Server-side ingest status.
    async fn stream_status(&self) -> StreamlayResult<StreamStatus>;

    /// Server liveness.
    async fn health(&self) -> StreamlayResult<HealthStatus>;
}
