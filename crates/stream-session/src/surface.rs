//! Media surface abstraction.
//!
//! A surface is whatever actually decodes and shows the stream. The session
//! drives it through this trait and never inspects media itself.

use serde::Serialize;
use streamlay_common::error::{StreamlayError, StreamlayResult};

/// What the surface is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceState {
    /// No source loaded.
    Empty,
    /// Source loaded, not playing.
    Loaded,
    Playing,
    Paused,
}

/// Trait for a video rendering surface.
pub trait MediaSurface: Send {
    /// Load a source, replacing any previous one.
    fn load(&mut self, source: &str) -> StreamlayResult<()>;

    /// Begin or resume playback.
    fn play(&mut self) -> StreamlayResult<()>;

    /// Halt playback, keeping the position.
    fn pause(&mut self) -> StreamlayResult<()>;

    /// Halt playback, rewind, and unload the source.
    fn stop(&mut self) -> StreamlayResult<()>;

    /// Set output volume in `[0.0, 1.0]`.
    fn set_volume(&mut self, volume: f32);

    /// Intrinsic pixel size of the surface.
    fn dimensions(&self) -> (u32, u32);

    fn state(&self) -> SurfaceState;
}

/// A surface with no decoder behind it.
///
/// Tracks state transitions so the rest of the system can run without a
/// real video pipeline (CLI, tests).
#[derive(Debug, Clone)]
pub struct HeadlessSurface {
    width: u32,
    height: u32,
    source: Option<String>,
    state: SurfaceState,
    volume: f32,
    position_secs: f64,
}

impl HeadlessSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            source: None,
            state: SurfaceState::Empty,
            volume: 1.0,
            position_secs: 0.0,
        }
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn position_secs(&self) -> f64 {
        self.position_secs
    }

    /// Move the playhead, as a decoder would while playing.
    pub fn advance(&mut self, secs: f64) {
        if self.state == SurfaceState::Playing {
            self.position_secs += secs;
        }
    }
}

impl MediaSurface for HeadlessSurface {
    fn load(&mut self, source: &str) -> StreamlayResult<()> {
        if source.is_empty() {
            return Err(StreamlayError::media("Empty media source"));
        }
        self.source = Some(source.to_string());
        self.state = SurfaceState::Loaded;
        self.position_secs = 0.0;
        Ok(())
    }

    fn play(&mut self) -> StreamlayResult<()> {
        if self.source.is_none() {
            return Err(StreamlayError::media("No media source loaded"));
        }
        self.state = SurfaceState::Playing;
        Ok(())
    }

    fn pause(&mut self) -> StreamlayResult<()> {
        if self.state == SurfaceState::Playing {
            self.state = SurfaceState::Paused;
        }
        Ok(())
    }

    fn stop(&mut self) -> StreamlayResult<()> {
        self.source = None;
        self.state = SurfaceState::Empty;
        self.position_secs = 0.0;
        Ok(())
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
    }

    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn state(&self) -> SurfaceState {
        self.state
    }
}
