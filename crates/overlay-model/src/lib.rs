//! Streamlay Overlay Model
//!
//! Defines the data contracts shared by every Streamlay crate:
//! - **Overlay:** A persisted text or image element positioned over the video surface
//! - **OverlayDraft:** The editable fields of an overlay before the store assigns an id
//! - **Stream:** Saved stream settings and the remote stream/health payloads
//!
//! Positions are integer percentages of the surface, sizes are pixels.

pub mod overlay;
pub mod stream;

pub use overlay::*;
pub use stream::*;
