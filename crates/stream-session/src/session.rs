//! Playback session management.

use std::fmt;

use serde::Serialize;
use streamlay_common::error::{StreamlayError, StreamlayResult};

use crate::surface::{MediaSurface, SurfaceState};

/// Scheme every stream URL must carry.
pub const RTSP_SCHEME: &str = "rtsp://";

/// Message shown when the surface refuses to play.
pub const PLAY_FAILED_MESSAGE: &str = "Failed to play video";

/// Playback state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlaybackState {
    /// No source on the surface.
    NoStream,
    /// Source loaded, waiting for play.
    Ready,
    Playing,
    Paused,
}

impl PlaybackState {
    /// Status line shown next to the stream.
    pub fn label(&self) -> &'static str {
        match self {
            PlaybackState::NoStream => "No Stream",
            PlaybackState::Ready => "Stream Ready - Click Play",
            PlaybackState::Playing => "Playing",
            PlaybackState::Paused => "Paused",
        }
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Callbacks raised by the surface itself (native controls, decoder errors).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEvent {
    Playing,
    Paused,
    Error(String),
}

/// Check that `url` is a usable stream URL.
pub fn validate_rtsp_url(url: &str) -> StreamlayResult<()> {
    if url.trim().is_empty() {
        return Err(StreamlayError::invalid_field(
            "rtsp_url",
            "Please enter an RTSP URL first",
        ));
    }
    if !url.starts_with(RTSP_SCHEME) {
        return Err(StreamlayError::invalid_field(
            "rtsp_url",
            "Please enter a valid RTSP URL (starts with rtsp://)",
        ));
    }
    Ok(())
}

/// A playback session bound to one media surface.
pub struct StreamSession {
    url: String,
    active_source: Option<String>,
    state: PlaybackState,
    volume: f32,
    error: Option<String>,
    surface: Box<dyn MediaSurface>,
}

impl fmt::Debug for StreamSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamSession")
            .field("url", &self.url)
            .field("active_source", &self.active_source)
            .field("state", &self.state)
            .field("volume", &self.volume)
            .field("error", &self.error)
            .field("surface_state", &self.surface.state())
            .finish()
    }
}

impl StreamSession {
    /// Create an idle session on `surface`.
    pub fn new(surface: Box<dyn MediaSurface>) -> Self {
        Self {
            url: String::new(),
            active_source: None,
            state: PlaybackState::NoStream,
            volume: 1.0,
            error: None,
            surface,
        }
    }

    /// Current playback state.
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// The configured stream URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The source loaded on the surface, if any.
    pub fn active_source(&self) -> Option<&str> {
        self.active_source.as_deref()
    }

    pub fn has_source(&self) -> bool {
        self.active_source.is_some()
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// The error to display, if the last attempt failed.
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn surface_state(&self) -> SurfaceState {
        self.surface.state()
    }

    pub fn surface_dimensions(&self) -> (u32, u32) {
        self.surface.dimensions()
    }

    /// Status line for the current state.
    pub fn status_label(&self) -> &'static str {
        self.state.label()
    }

    /// Point the session at a different URL.
    ///
    /// Any active session and its error are discarded, whatever the current
    /// state. Returns `false` when `url` is already configured.
    pub fn set_source(&mut self, url: impl Into<String>) -> bool {
        let url = url.into();
        if url == self.url {
            return false;
        }
        tracing::debug!(%url, "Stream source changed");
        self.unload();
        self.url = url;
        self.error = None;
        true
    }

    /// Validate `url`, load it on the surface, and move to `Ready`.
    ///
    /// Only valid from `NoStream`. A rejected URL leaves the session in
    /// `NoStream` with the validation message displayed.
    pub fn start(&mut self, url: &str) -> StreamlayResult<PlaybackState> {
        if self.state != PlaybackState::NoStream {
            return Err(StreamlayError::session("Stream already started"));
        }
        self.set_source(url);

        if let Err(e) = validate_rtsp_url(url) {
            tracing::debug!(%url, error = %e, "Rejected stream URL");
            self.error = Some(e.to_string());
            return Err(e);
        }

        if let Err(e) = self.surface.load(url) {
            tracing::warn!(%url, error = %e, "Surface failed to load stream");
            self.error = Some(e.to_string());
            return Err(e);
        }
        self.surface.set_volume(self.volume);
        self.active_source = Some(url.to_string());
        self.transition(PlaybackState::Ready);
        tracing::info!(%url, "Stream ready");
        Ok(self.state)
    }

    /// Begin or resume playback (`Ready`/`Paused` → `Playing`).
    ///
    /// If the surface refuses, the state is left as it was and the failure
    /// is shown as the session error.
    pub fn play(&mut self) -> StreamlayResult<PlaybackState> {
        match self.state {
            PlaybackState::Playing => return Ok(self.state),
            PlaybackState::NoStream => return Err(StreamlayError::session("No active stream")),
            PlaybackState::Ready | PlaybackState::Paused => {}
        }

        if let Err(e) = self.surface.play() {
            tracing::warn!(error = %e, "Playback failed to start");
            self.error = Some(PLAY_FAILED_MESSAGE.to_string());
            return Err(StreamlayError::media(format!("{PLAY_FAILED_MESSAGE}: {e}")));
        }
        self.transition(PlaybackState::Playing);
        Ok(self.state)
    }

    /// Pause playback (`Playing` → `Paused`).
    pub fn pause(&mut self) -> StreamlayResult<PlaybackState> {
        match self.state {
            PlaybackState::Paused => return Ok(self.state),
            PlaybackState::Playing => {}
            PlaybackState::NoStream | PlaybackState::Ready => {
                return Err(StreamlayError::session("Not playing"));
            }
        }

        if let Err(e) = self.surface.pause() {
            tracing::warn!(error = %e, "Surface failed to pause");
            self.error = Some(e.to_string());
            return Err(e);
        }
        self.transition(PlaybackState::Paused);
        Ok(self.state)
    }

    /// Play when paused or ready, pause when playing.
    pub fn toggle(&mut self) -> StreamlayResult<PlaybackState> {
        if self.state == PlaybackState::Playing {
            self.pause()
        } else {
            self.play()
        }
    }

    /// Halt, rewind, and drop the active source. Valid from any state.
    pub fn stop(&mut self) -> PlaybackState {
        self.unload();
        self.error = None;
        tracing::info!("Stream stopped");
        self.state
    }

    /// Set playback volume; clamped to `[0.0, 1.0]`, NaN is ignored.
    pub fn set_volume(&mut self, volume: f32) -> f32 {
        if volume.is_nan() {
            return self.volume;
        }
        self.volume = volume.clamp(0.0, 1.0);
        if self.has_source() {
            self.surface.set_volume(self.volume);
        }
        self.volume
    }

    /// Apply a callback raised by the surface.
    pub fn handle_surface_event(&mut self, event: SurfaceEvent) -> PlaybackState {
        match event {
            SurfaceEvent::Playing if self.has_source() => {
                self.transition(PlaybackState::Playing);
            }
            SurfaceEvent::Paused if self.state == PlaybackState::Playing => {
                self.transition(PlaybackState::Paused);
            }
            SurfaceEvent::Error(message) => self.report_media_error(message),
            _ => {}
        }
        self.state
    }

    /// Show a media failure without changing the playback state.
    pub fn report_media_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(state = ?self.state, %message, "Media error");
        self.error = Some(message);
    }

    /// Move to `next`; a successful transition replaces any shown error.
    fn transition(&mut self, next: PlaybackState) {
        if self.state != next {
            tracing::debug!(from = ?self.state, to = ?next, "Playback state changed");
        }
        self.state = next;
        self.error = None;
    }

    fn unload(&mut self) {
        if self.active_source.take().is_some() {
            if let Err(e) = self.surface.stop() {
                tracing::warn!(error = %e, "Surface failed to stop cleanly");
            }
        }
        self.state = PlaybackState::NoStream;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::HeadlessSurface;

    /// Surface whose play always fails, as when the media cannot be decoded.
    struct BrokenSurface {
        inner: HeadlessSurface,
    }

    impl MediaSurface for BrokenSurface {
        fn load(&mut self, source: &str) -> StreamlayResult<()> {
            self.inner.load(source)
        }
        fn play(&mut self) -> StreamlayResult<()> {
            Err(StreamlayError::media("decoder unavailable"))
        }
        fn pause(&mut self) -> StreamlayResult<()> {
            self.inner.pause()
        }
        fn stop(&mut self) -> StreamlayResult<()> {
            self.inner.stop()
        }
        fn set_volume(&mut self, volume: f32) {
            self.inner.set_volume(volume)
        }
        fn dimensions(&self) -> (u32, u32) {
            self.inner.dimensions()
        }
        fn state(&self) -> SurfaceState {
            self.inner.state()
        }
    }

    fn session() -> StreamSession {
        StreamSession::new(Box::new(HeadlessSurface::new(800, 400)))
    }

    #[test]
    fn test_start_rejects_non_rtsp_url() {
        let mut session = session();
        let err = session.start("http://bad").unwrap_err();
        assert!(matches!(err, StreamlayError::Validation { .. }));
        assert_eq!(session.state(), PlaybackState::NoStream);
        assert_eq!(
            session.error_message(),
            Some("Please enter a valid RTSP URL (starts with rtsp://)")
        );
        assert!(!session.has_source());
    }

    #[test]
    fn test_start_rejects_empty_url() {
        let mut session = session();
        assert!(session.start("").is_err());
        assert_eq!(session.state(), PlaybackState::NoStream);
        assert_eq!(session.error_message(), Some("Please enter an RTSP URL first"));
    }

    #[test]
    fn test_full_playback_cycle() {
        let mut session = session();
        assert_eq!(
            session.start("rtsp://example.com/s").unwrap(),
            PlaybackState::Ready
        );
        assert_eq!(session.status_label(), "Stream Ready - Click Play");
        assert_eq!(session.surface_state(), SurfaceState::Loaded);

        assert_eq!(session.play().unwrap(), PlaybackState::Playing);
        assert_eq!(session.surface_state(), SurfaceState::Playing);
        assert_eq!(session.pause().unwrap(), PlaybackState::Paused);
        assert_eq!(session.toggle().unwrap(), PlaybackState::Playing);

        assert_eq!(session.stop(), PlaybackState::NoStream);
        assert_eq!(session.surface_state(), SurfaceState::Empty);
        assert!(session.active_source().is_none());
        assert_eq!(session.url(), "rtsp://example.com/s");
    }

    #[test]
    fn test_illegal_transitions() {
        let mut session = session();
        assert!(session.play().is_err());
        assert!(session.pause().is_err());

        session.start("rtsp://cam/1").unwrap();
        assert!(session.pause().is_err());
        assert!(session.start("rtsp://cam/2").is_err());
        assert_eq!(session.state(), PlaybackState::Ready);
    }

    #[test]
    fn test_error_cleared_by_next_successful_transition() {
        let mut session = session();
        session.start("rtsp://cam/1").unwrap();
        session.play().unwrap();
        session.handle_surface_event(SurfaceEvent::Error("Video loading error".into()));
        assert_eq!(session.state(), PlaybackState::Playing);
        assert_eq!(session.error_message(), Some("Video loading error"));

        session.pause().unwrap();
        assert!(session.error_message().is_none());
    }

    #[test]
    fn test_play_failure_keeps_state() {
        let mut session = StreamSession::new(Box::new(BrokenSurface {
            inner: HeadlessSurface::new(640, 360),
        }));
        session.start("rtsp://cam/1").unwrap();

        let err = session.play().unwrap_err();
        assert!(matches!(err, StreamlayError::Media { .. }));
        assert_eq!(session.state(), PlaybackState::Ready);
        assert_eq!(session.error_message(), Some(PLAY_FAILED_MESSAGE));
    }

    #[test]
    fn test_source_change_discards_session_from_any_state() {
        let mut session = session();
        session.start("rtsp://cam/1").unwrap();
        session.play().unwrap();
        session.report_media_error("stutter");

        assert!(session.set_source("rtsp://cam/2"));
        assert_eq!(session.state(), PlaybackState::NoStream);
        assert!(session.error_message().is_none());
        assert_eq!(session.surface_state(), SurfaceState::Empty);

        assert!(!session.set_source("rtsp://cam/2"));
    }

    #[test]
    fn test_surface_events_follow_native_controls() {
        let mut session = session();
        assert_eq!(
            session.handle_surface_event(SurfaceEvent::Playing),
            PlaybackState::NoStream
        );

        session.start("rtsp://cam/1").unwrap();
        assert_eq!(
            session.handle_surface_event(SurfaceEvent::Playing),
            PlaybackState::Playing
        );
        assert_eq!(
            session.handle_surface_event(SurfaceEvent::Paused),
            PlaybackState::Paused
        );
    }

    #[test]
    fn test_volume_is_clamped() {
        let mut session = session();
        assert_eq!(session.set_volume(1.7), 1.0);
        assert_eq!(session.set_volume(-0.2), 0.0);
        assert_eq!(session.set_volume(f32::NAN), 0.0);
        assert_eq!(session.set_volume(0.4), 0.4);
    }
}
