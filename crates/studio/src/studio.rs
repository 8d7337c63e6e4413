//! The top-level viewer session.

use std::sync::Arc;

use streamlay_common::error::{ErrorKind, StreamlayError, StreamlayResult};
use streamlay_overlay_form::{ConfirmGate, Deletion, FormMode, OverlayForm, SubmitAction};
use streamlay_overlay_model::{Overlay, OverlayId, OverlayKind, StreamSettings};
use streamlay_render_engine::{compose_with_failures, FailedImages, Scene, Surface};
use streamlay_stream_session::{MediaSurface, PlaybackState, StreamSession, SurfaceEvent};
use streamlay_store_client::OverlayStore;
use tokio::sync::broadcast;

use crate::events::{EventBus, Notice, NoticeLevel, StudioEvent};
use crate::view::{StreamInfo, StudioView};

/// Ties the store, form, playback session and compositor together.
///
/// Every mutating call publishes at least one [`StudioEvent`]. The overlay
/// list is only ever replaced by a full reload from the store.
pub struct Studio {
    store: Arc<dyn OverlayStore>,
    overlays: Vec<Overlay>,
    form: OverlayForm,
    session: StreamSession,
    failed_images: FailedImages,
    bus: Arc<EventBus>,
}

impl Studio {
    pub fn new(store: Arc<dyn OverlayStore>, surface: Box<dyn MediaSurface>) -> Self {
        Self {
            store,
            overlays: Vec::new(),
            form: OverlayForm::new(),
            session: StreamSession::new(surface),
            failed_images: FailedImages::new(),
            bus: Arc::new(EventBus::default()),
        }
    }

    /// Publish on a shared bus instead of a private one.
    pub fn with_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.bus = bus;
        self
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StudioEvent> {
        self.bus.subscribe()
    }

    pub fn overlays(&self) -> &[Overlay] {
        &self.overlays
    }

    pub fn form(&self) -> &OverlayForm {
        &self.form
    }

    pub fn session(&self) -> &StreamSession {
        &self.session
    }

    pub fn rtsp_url(&self) -> &str {
        self.session.url()
    }

    /// Load saved stream settings, then the overlay list.
    ///
    /// Missing or unreadable settings leave the URL empty; only a failed
    /// overlay load is reported as an error.
    pub async fn load(&mut self) -> StreamlayResult<()> {
        match self.store.get_stream_settings().await {
            Ok(settings) => self.set_rtsp_url(settings.rtsp_url),
            Err(e) => tracing::warn!(error = %e, "Failed to load stream settings"),
        }
        self.reload_overlays().await?;
        Ok(())
    }

    /// Replace the overlay list with the server's current one.
    pub async fn reload_overlays(&mut self) -> StreamlayResult<&[Overlay]> {
        match self.store.list_overlays().await {
            Ok(overlays) => {
                self.replace_overlays(overlays);
                Ok(&self.overlays)
            }
            Err(e) => {
                self.notify(NoticeLevel::Error, "Failed to load overlays");
                Err(e)
            }
        }
    }

    // Stream URL

    /// Edit the stream URL. A different URL discards the active session.
    pub fn set_rtsp_url(&mut self, url: impl Into<String>) {
        let url = url.into();
        let was_idle = self.session.state() == PlaybackState::NoStream;
        if !self.session.set_source(url.clone()) {
            return;
        }
        tracing::debug!(%url, "Stream URL changed");
        self.bus.publish(StudioEvent::StreamUrlChanged { url });
        if !was_idle {
            self.publish_playback();
        }
    }

    /// Persist the current stream URL. Blank input is rejected locally.
    pub async fn save_stream_url(&mut self) -> StreamlayResult<StreamSettings> {
        let url = self.session.url().to_string();
        if url.trim().is_empty() {
            let message = "Please enter an RTSP URL";
            self.notify(NoticeLevel::Error, message);
            return Err(StreamlayError::invalid_field("rtsp_url", message));
        }

        match self.store.save_stream_settings(&StreamSettings::new(url)).await {
            Ok(saved) => {
                self.notify(NoticeLevel::Success, "Stream settings saved successfully");
                Ok(saved)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Saving stream settings failed");
                self.notify(NoticeLevel::Error, "Failed to save stream settings");
                Err(e)
            }
        }
    }

    /// Empty the URL input. Saved settings are left alone.
    pub fn clear_stream_url(&mut self) {
        self.set_rtsp_url(String::new());
    }

    // Overlay form

    pub fn toggle_form(&mut self) -> bool {
        let visible = self.form.toggle_visibility();
        self.publish_form();
        visible
    }

    /// Apply raw input to a form field by name (`"name"`, `"position.x"`, ...).
    pub fn form_input(&mut self, field: &str, value: &str) -> StreamlayResult<()> {
        self.form.input(field, value)?;
        self.publish_form();
        Ok(())
    }

    /// Load an overlay from the current list into the form.
    pub fn edit_overlay(&mut self, id: &OverlayId) -> StreamlayResult<()> {
        let overlay = self
            .overlays
            .iter()
            .find(|o| &o.id == id)
            .ok_or_else(|| StreamlayError::not_found(format!("overlay {id}")))?;
        self.form.begin_edit(overlay);
        self.publish_form();
        Ok(())
    }

    pub fn cancel_form(&mut self) {
        self.form.cancel();
        self.publish_form();
    }

    /// Submit the form and adopt the reloaded list.
    ///
    /// A failed reload after a committed write still returns `Ok`; the
    /// previous list is kept.
    pub async fn submit_form(&mut self) -> StreamlayResult<Overlay> {
        let result = self.form.submit(self.store.as_ref()).await;
        self.publish_form();

        match result {
            Ok(submission) => {
                let message = match submission.action {
                    SubmitAction::Created => "Overlay created successfully",
                    SubmitAction::Updated => "Overlay updated successfully",
                };
                self.notify(NoticeLevel::Success, message);
                match submission.overlays {
                    Ok(overlays) => self.replace_overlays(overlays),
                    Err(_) => self.notify(NoticeLevel::Error, "Failed to load overlays"),
                }
                Ok(submission.overlay)
            }
            Err(e) if e.kind() == ErrorKind::Validation => {
                self.notify(NoticeLevel::Error, e.to_string());
                Err(e)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Saving overlay failed");
                self.notify(NoticeLevel::Error, "Failed to save overlay");
                Err(e)
            }
        }
    }

    /// Delete an overlay once `gate` approves. Returns `false` when declined.
    pub async fn delete_overlay(
        &mut self,
        id: &OverlayId,
        gate: &dyn ConfirmGate,
    ) -> StreamlayResult<bool> {
        let was_editing = self.form.mode() == &FormMode::Edit(id.clone());
        match self.form.delete(self.store.as_ref(), id, gate).await {
            Ok(Deletion::Declined) => Ok(false),
            Ok(Deletion::Deleted(overlays)) => {
                self.replace_overlays(overlays);
                if was_editing {
                    self.publish_form();
                }
                self.notify(NoticeLevel::Success, "Overlay deleted successfully");
                Ok(true)
            }
            Err(e) => {
                tracing::warn!(%id, error = %e, "Deleting overlay failed");
                self.notify(NoticeLevel::Error, "Failed to delete overlay");
                Err(e)
            }
        }
    }

    // Playback

    /// Start a session on the configured URL.
    pub fn start_stream(&mut self) -> StreamlayResult<PlaybackState> {
        let url = self.session.url().to_string();
        let result = self.session.start(&url);
        self.publish_playback();
        result
    }

    pub fn play(&mut self) -> StreamlayResult<PlaybackState> {
        let result = self.session.play();
        self.publish_playback();
        result
    }

    pub fn pause(&mut self) -> StreamlayResult<PlaybackState> {
        let result = self.session.pause();
        self.publish_playback();
        result
    }

    pub fn toggle_playback(&mut self) -> StreamlayResult<PlaybackState> {
        let result = self.session.toggle();
        self.publish_playback();
        result
    }

    pub fn stop_stream(&mut self) -> PlaybackState {
        let state = self.session.stop();
        self.publish_playback();
        state
    }

    pub fn set_volume(&mut self, volume: f32) -> f32 {
        let volume = self.session.set_volume(volume);
        self.bus.publish(StudioEvent::VolumeChanged { volume });
        volume
    }

    pub fn handle_surface_event(&mut self, event: SurfaceEvent) -> PlaybackState {
        let state = self.session.handle_surface_event(event);
        self.publish_playback();
        state
    }

    /// Record that an image overlay's resource failed to load.
    ///
    /// Returns `false` when `id` is not an image overlay in the list.
    pub fn report_image_failed(&mut self, id: &OverlayId) -> bool {
        let Some(overlay) = self
            .overlays
            .iter()
            .find(|o| &o.id == id && o.kind == OverlayKind::Image)
        else {
            return false;
        };
        tracing::warn!(%id, src = %overlay.content, "Overlay image failed to load");
        self.failed_images
            .mark(overlay.id.clone(), overlay.content.clone());
        self.bus.publish(StudioEvent::OverlayImageFailed { id: id.clone() });
        true
    }

    // Rendering

    /// Compose the current frame.
    pub fn render(&self) -> StudioView {
        let (width, height) = self.session.surface_dimensions();
        let surface = Surface::new(width, height);
        let scene = if self.session.has_source() {
            compose_with_failures(surface, &self.overlays, &self.failed_images)
        } else {
            Scene::empty(surface)
        };

        StudioView {
            stream: StreamInfo {
                url: self.session.url().to_string(),
                active_source: self.session.active_source().map(str::to_string),
                state: self.session.state(),
                status: self.session.status_label(),
                error: self.session.error_message().map(str::to_string),
                volume: self.session.volume(),
            },
            scene,
            summaries: self.overlays.iter().map(Overlay::summary).collect(),
        }
    }

    fn replace_overlays(&mut self, overlays: Vec<Overlay>) {
        self.failed_images.retain_current(&overlays);
        self.overlays = overlays;
        tracing::debug!(count = self.overlays.len(), "Overlay list reloaded");
        self.bus.publish(StudioEvent::OverlaysReloaded {
            count: self.overlays.len(),
        });
    }

    fn notify(&self, level: NoticeLevel, message: impl Into<String>) {
        let notice = Notice::new(level, message);
        match level {
            NoticeLevel::Error => tracing::warn!(message = %notice.message, "Notice"),
            _ => tracing::info!(message = %notice.message, "Notice"),
        }
        self.bus.publish(StudioEvent::Notice(notice));
    }

    fn publish_form(&self) {
        let editing = match self.form.mode() {
            FormMode::Edit(id) => Some(id.clone()),
            FormMode::Create => None,
        };
        self.bus.publish(StudioEvent::FormChanged {
            editing,
            visible: self.form.is_visible(),
        });
    }

    fn publish_playback(&self) {
        self.bus.publish(StudioEvent::PlaybackChanged {
            state: self.session.state(),
            error: self.session.error_message().map(str::to_string),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use streamlay_stream_session::HeadlessSurface;
    use streamlay_store_client::MemoryStore;

    fn studio() -> (Arc<MemoryStore>, Studio) {
        let store = Arc::new(MemoryStore::new());
        let studio = Studio::new(store.clone(), Box::new(HeadlessSurface::new(800, 400)));
        (store, studio)
    }

    fn drain(rx: &mut broadcast::Receiver<StudioEvent>) -> Vec<StudioEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    fn notices(events: &[StudioEvent]) -> Vec<&str> {
        events
            .iter()
            .filter_map(|e| match e {
                StudioEvent::Notice(n) => Some(n.message.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_shared_bus_receives_studio_events() {
        let bus = Arc::new(EventBus::default());
        let mut rx = bus.subscribe();
        let (_store, studio) = studio();
        let mut studio = studio.with_bus(Arc::clone(&bus));

        studio.toggle_form();
        assert_eq!(
            rx.try_recv().unwrap(),
            StudioEvent::FormChanged {
                editing: None,
                visible: true,
            }
        );
    }

    #[tokio::test]
    async fn test_load_applies_saved_url() {
        let store = Arc::new(MemoryStore::with_settings(StreamSettings::new(
            "rtsp://cam/saved",
        )));
        let mut studio = Studio::new(store, Box::new(HeadlessSurface::new(800, 400)));
        studio.load().await.unwrap();
        assert_eq!(studio.rtsp_url(), "rtsp://cam/saved");
        assert!(studio.overlays().is_empty());
    }

    #[tokio::test]
    async fn test_blank_url_is_not_saved() {
        let (store, mut studio) = studio();
        let mut rx = studio.subscribe();
        studio.set_rtsp_url("   ");

        let err = studio.save_stream_url().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(store.calls().is_empty());
        assert_eq!(notices(&drain(&mut rx)), ["Please enter an RTSP URL"]);
    }

    #[tokio::test]
    async fn test_save_and_clear_url() {
        let (store, mut studio) = studio();
        let mut rx = studio.subscribe();
        studio.set_rtsp_url("rtsp://cam/1");
        studio.save_stream_url().await.unwrap();
        assert_eq!(
            store.get_stream_settings().await.unwrap().rtsp_url,
            "rtsp://cam/1"
        );

        studio.clear_stream_url();
        assert_eq!(studio.rtsp_url(), "");
        // Clearing only touches the input.
        assert_eq!(
            store.get_stream_settings().await.unwrap().rtsp_url,
            "rtsp://cam/1"
        );
        let events = drain(&mut rx);
        assert!(notices(&events).contains(&"Stream settings saved successfully"));
        assert!(events.contains(&StudioEvent::StreamUrlChanged { url: String::new() }));
    }

    #[tokio::test]
    async fn test_failed_submit_notifies_and_keeps_list() {
        let (store, mut studio) = studio();
        let mut rx = studio.subscribe();
        studio.form_input("name", "Logo").unwrap();
        studio.form_input("content", "LIVE").unwrap();
        store.fail_next(500, "boom");

        assert!(studio.submit_form().await.is_err());
        assert!(studio.overlays().is_empty());
        assert_eq!(studio.form().draft().name, "Logo");
        assert_eq!(notices(&drain(&mut rx)), ["Failed to save overlay"]);
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_committed_create() {
        let (store, mut studio) = studio();
        studio.load().await.unwrap();
        let mut rx = studio.subscribe();
        studio.form_input("name", "Logo").unwrap();
        studio.form_input("content", "LIVE").unwrap();
        store.fail_next_list(503, "list unavailable");

        let created = studio.submit_form().await.unwrap();
        assert_eq!(created.name, "Logo");
        assert_eq!(store.snapshot().len(), 1);
        // The stale list stays until the next successful reload.
        assert!(studio.overlays().is_empty());
        assert_eq!(
            notices(&drain(&mut rx)),
            ["Overlay created successfully", "Failed to load overlays"]
        );
    }

    #[tokio::test]
    async fn test_validation_failure_shows_field_message() {
        let (_store, mut studio) = studio();
        let mut rx = studio.subscribe();
        studio.form_input("content", "LIVE").unwrap();
        assert!(studio.submit_form().await.is_err());
        assert_eq!(notices(&drain(&mut rx)), ["Name is required"]);
    }

    #[tokio::test]
    async fn test_overlays_render_only_with_active_source() {
        let (_store, mut studio) = studio();
        studio.form_input("name", "Tag").unwrap();
        studio.form_input("content", "LIVE").unwrap();
        studio.form_input("position.x", "50").unwrap();
        studio.form_input("position.y", "50").unwrap();
        studio.submit_form().await.unwrap();

        let view = studio.render();
        assert!(view.scene.overlays.is_empty());
        assert_eq!(view.summaries.len(), 1);
        assert_eq!(view.stream.status, "No Stream");

        studio.set_rtsp_url("rtsp://example.com/s");
        studio.start_stream().unwrap();
        let view = studio.render();
        assert_eq!(view.stream.status, "Stream Ready - Click Play");
        assert_eq!(view.scene.overlays[0].rect.left, 400.0);
        assert_eq!(view.scene.overlays[0].rect.top, 200.0);

        studio.stop_stream();
        assert!(studio.render().scene.overlays.is_empty());
    }

    #[tokio::test]
    async fn test_failed_image_is_hidden_until_content_changes() {
        let (_store, mut studio) = studio();
        studio.form_input("name", "Logo").unwrap();
        studio.form_input("type", "image").unwrap();
        studio.form_input("content", "https://x/broken.png").unwrap();
        let logo = studio.submit_form().await.unwrap();

        studio.set_rtsp_url("rtsp://cam/1");
        studio.start_stream().unwrap();
        assert!(studio.report_image_failed(&logo.id));
        assert_eq!(studio.render().scene.visible().count(), 0);

        studio.edit_overlay(&logo.id).unwrap();
        studio.form_input("content", "https://x/fixed.png").unwrap();
        studio.submit_form().await.unwrap();
        assert_eq!(studio.render().scene.visible().count(), 1);
    }

    #[tokio::test]
    async fn test_image_failure_and_volume_are_published() {
        let (_store, mut studio) = studio();
        studio.form_input("name", "Logo").unwrap();
        studio.form_input("type", "image").unwrap();
        studio.form_input("content", "https://x/broken.png").unwrap();
        let logo = studio.submit_form().await.unwrap();
        let mut rx = studio.subscribe();

        assert!(studio.report_image_failed(&logo.id));
        assert!(!studio.report_image_failed(&OverlayId::new("missing")));
        assert_eq!(studio.set_volume(1.5), 1.0);
        assert_eq!(
            drain(&mut rx),
            [
                StudioEvent::OverlayImageFailed { id: logo.id.clone() },
                StudioEvent::VolumeChanged { volume: 1.0 },
            ]
        );
    }

    #[tokio::test]
    async fn test_url_change_stops_playback() {
        let (_store, mut studio) = studio();
        studio.set_rtsp_url("rtsp://cam/1");
        studio.start_stream().unwrap();
        studio.play().unwrap();
        let mut rx = studio.subscribe();

        studio.set_rtsp_url("rtsp://cam/2");
        assert_eq!(studio.session().state(), PlaybackState::NoStream);
        let events = drain(&mut rx);
        assert!(events.contains(&StudioEvent::PlaybackChanged {
            state: PlaybackState::NoStream,
            error: None,
        }));
    }

    #[tokio::test]
    async fn test_invalid_url_keeps_no_stream_with_message() {
        let (_store, mut studio) = studio();
        studio.set_rtsp_url("http://bad");
        assert!(studio.start_stream().is_err());
        let view = studio.render();
        assert_eq!(view.stream.state, PlaybackState::NoStream);
        assert_eq!(
            view.stream.error.as_deref(),
            Some("Please enter a valid RTSP URL (starts with rtsp://)")
        );
    }
}
