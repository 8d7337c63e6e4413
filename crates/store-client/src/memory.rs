//! In-process [`OverlayStore`] used by tests and offline demos.
//!
//! Mirrors the server's observable behaviour: sequential ids, insertion-order
//! listing, 404 for unknown ids, and a single overwritable settings record.
//! Every call is recorded so callers can assert on what was issued.

use std::sync::Mutex;

use chrono::Utc;
use streamlay_common::error::{StreamlayError, StreamlayResult};
use streamlay_overlay_model::{
    HealthStatus, Overlay, OverlayDraft, OverlayId, StreamSettings, StreamStarted, StreamStatus,
};

use crate::OverlayStore;

/// A request as seen by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    List,
    Get(OverlayId),
    Create(OverlayDraft),
    Update(OverlayId, OverlayDraft),
    Delete(OverlayId),
    GetSettings,
    SaveSettings(StreamSettings),
    StartStream(String),
    StopStream,
    Status,
    Health,
}

#[derive(Debug, Default)]
struct MemoryState {
    overlays: Vec<Overlay>,
    next_id: u64,
    settings: StreamSettings,
    status: StreamStatus,
    calls: Vec<StoreCall>,
    fail_next: Option<(u16, String)>,
    fail_next_list: Option<(u16, String)>,
}

/// Overlay store held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with saved stream settings.
    pub fn with_settings(settings: StreamSettings) -> Self {
        let store = Self::default();
        store.lock().settings = settings;
        store
    }

    /// Make the next call fail with the given HTTP status.
    pub fn fail_next(&self, status: u16, body: impl Into<String>) {
        self.lock().fail_next = Some((status, body.into()));
    }

    /// Make the next `list_overlays` fail, leaving writes before it untouched.
    pub fn fail_next_list(&self, status: u16, body: impl Into<String>) {
        self.lock().fail_next_list = Some((status, body.into()));
    }

    /// Every call issued so far, oldest first.
    pub fn calls(&self) -> Vec<StoreCall> {
        self.lock().calls.clone()
    }

    /// Forget the recorded calls.
    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    /// Current contents, bypassing call recording.
    pub fn snapshot(&self) -> Vec<Overlay> {
        self.lock().overlays.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        // A poisoned lock only means a test panicked mid-call; the data is still usable.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record a call and apply any injected failure.
    fn begin(&self, call: StoreCall) -> StreamlayResult<std::sync::MutexGuard<'_, MemoryState>> {
        let mut state = self.lock();
        state.calls.push(call);
        if let Some((status, body)) = state.fail_next.take() {
            return Err(StreamlayError::api(status, body));
        }
        Ok(state)
    }
}

fn not_found() -> StreamlayError {
    StreamlayError::api(404, "Overlay not found")
}

#[async_trait::async_trait]
impl OverlayStore for MemoryStore {
    async fn list_overlays(&self) -> StreamlayResult<Vec<Overlay>> {
        let mut state = self.begin(StoreCall::List)?;
        if let Some((status, body)) = state.fail_next_list.take() {
            return Err(StreamlayError::api(status, body));
        }
        Ok(state.overlays.clone())
    }

    async fn get_overlay(&self, id: &OverlayId) -> StreamlayResult<Overlay> {
        let state = self.begin(StoreCall::Get(id.clone()))?;
        state
            .overlays
            .iter()
            .find(|o| &o.id == id)
            .cloned()
            .ok_or_else(not_found)
    }

    async fn create_overlay(&self, draft: &OverlayDraft) -> StreamlayResult<Overlay> {
        let mut state = self.begin(StoreCall::Create(draft.clone()))?;
        state.next_id += 1;
        let mut overlay = Overlay::from_draft(
            OverlayId::new(state.next_id.to_string()),
            draft.clone(),
        );
        overlay.created_at = Some(Utc::now());
        state.overlays.push(overlay.clone());
        Ok(overlay)
    }

    async fn update_overlay(
        &self,
        id: &OverlayId,
        draft: &OverlayDraft,
    ) -> StreamlayResult<Overlay> {
        let mut state = self.begin(StoreCall::Update(id.clone(), draft.clone()))?;
        let overlay = state
            .overlays
            .iter_mut()
            .find(|o| &o.id == id)
            .ok_or_else(not_found)?;
        overlay.apply(draft.clone());
        overlay.updated_at = Some(Utc::now());
        Ok(overlay.clone())
    }

    async fn delete_overlay(&self, id: &OverlayId) -> StreamlayResult<()> {
        let mut state = self.begin(StoreCall::Delete(id.clone()))?;
        let before = state.overlays.len();
        state.overlays.retain(|o| &o.id != id);
        if state.overlays.len() == before {
            return Err(not_found());
        }
        Ok(())
    }

    async fn get_stream_settings(&self) -> StreamlayResult<StreamSettings> {
        let state = self.begin(StoreCall::GetSettings)?;
        Ok(state.settings.clone())
    }

    async fn save_stream_settings(
        &self,
        settings: &StreamSettings,
    ) -> StreamlayResult<StreamSettings> {
        let mut state = self.begin(StoreCall::SaveSettings(settings.clone()))?;
        state.settings = settings.clone();
        Ok(settings.clone())
    }

    async fn start_stream(&self, rtsp_url: &str) -> StreamlayResult<StreamStarted> {
        let mut state = self.begin(StoreCall::StartStream(rtsp_url.to_string()))?;
        state.status = StreamStatus {
            is_running: true,
            current_url: Some(rtsp_url.to_string()),
            hls_url: Some("/static/hls/stream.m3u8".to_string()),
        };
        Ok(StreamStarted {
            message: Some("Stream started successfully".to_string()),
            hls_url: state.status.hls_url.clone(),
        })
    }

    async fn stop_stream(&self) -> StreamlayResult<()> {
        let mut state = self.begin(StoreCall::StopStream)?;
        state.status.is_running = false;
        state.status.hls_url = None;
        Ok(())
    }

    async fn stream_status(&self) -> StreamlayResult<StreamStatus> {
        let state = self.begin(StoreCall::Status)?;
        Ok(state.status.clone())
    }

    async fn health(&self) -> StreamlayResult<HealthStatus> {
        self.begin(StoreCall::Health)?;
        Ok(HealthStatus {
            status: "healthy".to_string(),
            message: Some("In-memory store".to_string()),
        })
    }
}
