//! Streamlay Stream Session
//!
//! Playback state for the video surface the overlays sit on.
//!
//! # State machine
//!
//! ```text
//!             start(rtsp://…)          play
//!  NoStream ─────────────────► Ready ────────► Playing
//!     ▲                                        │    ▲
//!     │ stop / source change        pause      ▼    │ play
//!     └──────────────────────────────────── Paused ─┘
//! ```
//!
//! Decoding is delegated to a [`MediaSurface`]; the session only tracks
//! which transitions succeeded and what error (if any) to show.

pub mod session;
pub mod surface;

pub use session::*;
pub use surface::*;
