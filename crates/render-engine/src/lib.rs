//! Streamlay Render Engine
//!
//! Turns the overlay list into absolute render instructions for a video
//! surface. Composition is a pure function of the surface size and the
//! overlays; the caller decides when to run a render pass.
//!
//! ```text
//! surface (w x h) ──┐
//!                   ├── compose ──► Scene
//! overlays[] ───────┘                 ├── RenderedOverlay (list order = z order)
//!                                     └── hidden images (failed loads)
//! ```

pub mod compositor;

pub use compositor::*;
