//! Streamlay Studio
//!
//! The top-level session of a Streamlay viewer. It owns the overlay list,
//! the overlay form, and the playback session, and announces every change
//! on an [`EventBus`] so frontends redraw from explicit notifications.
//!
//! ```text
//!  OverlayForm ──submit/delete──▶ dyn OverlayStore
//!       ▲                               │ list (after every write)
//!       │                               ▼
//!    Studio ──────────────────────▶ overlays ──▶ compose ──▶ StudioView
//!       │                                            ▲
//!       └──▶ StreamSession (surface size, source) ───┘
//! ```

pub mod events;
pub mod studio;
pub mod view;

pub use events::{EventBus, Notice, NoticeLevel, StudioEvent};
pub use studio::Studio;
pub use view::{StreamInfo, StudioView};
