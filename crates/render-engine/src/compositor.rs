//! Overlay compositor: places overlays over the video surface.
//!
//! Position is a percentage of the surface, size is absolute pixels, so an
//! overlay anchored at `(50%, 50%)` on an `800x400` surface starts at
//! `(400px, 200px)` whatever its size. Overlays never intercept pointer
//! input and are drawn in list order, later ones on top.

use std::collections::HashSet;

use serde::Serialize;
use streamlay_overlay_model::{Overlay, OverlayId, OverlayKind};

/// Intrinsic pixel size of the video surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Surface {
    pub width: u32,
    pub height: u32,
}

impl Surface {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Absolute placement of one overlay, in surface pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RenderRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl RenderRect {
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Whether two rects share any area.
    pub fn intersects(&self, other: &RenderRect) -> bool {
        self.left < other.right()
            && other.left < self.right()
            && self.top < other.bottom()
            && other.top < self.bottom()
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.left && x < self.right() && y >= self.top && y < self.bottom()
    }
}

/// What an overlay draws inside its rect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RenderContent {
    /// Literal text, never interpreted as markup.
    Text { text: String },
    /// An image reference. `visible` is false once the image failed to load.
    Image { src: String, visible: bool },
}

/// Render instruction for a single overlay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedOverlay {
    pub id: OverlayId,
    pub name: String,
    pub rect: RenderRect,
    /// Stacking order; equal to the overlay's index in the list.
    pub z_index: usize,
    pub content: RenderContent,
    /// Always false: overlays are advisory and let input through to the video.
    pub pointer_events: bool,
}

impl RenderedOverlay {
    /// Whether anything is drawn for this overlay.
    pub fn is_visible(&self) -> bool {
        match &self.content {
            RenderContent::Text { .. } => true,
            RenderContent::Image { visible, .. } => *visible,
        }
    }
}

/// A composed frame: every overlay placed on the surface, bottom to top.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scene {
    pub surface: Surface,
    pub overlays: Vec<RenderedOverlay>,
}

impl Scene {
    /// An empty scene (no active source).
    pub fn empty(surface: Surface) -> Self {
        Self {
            surface,
            overlays: Vec::new(),
        }
    }

    /// Hide an image overlay after its resource failed to load.
    ///
    /// Returns `false` when `id` is not an image overlay in this scene.
    /// The placement of every other overlay is unchanged.
    pub fn hide_image(&mut self, id: &OverlayId) -> bool {
        for overlay in &mut self.overlays {
            if &overlay.id != id {
                continue;
            }
            if let RenderContent::Image { visible, .. } = &mut overlay.content {
                *visible = false;
                return true;
            }
        }
        false
    }

    /// Overlays that draw something, bottom to top.
    pub fn visible(&self) -> impl Iterator<Item = &RenderedOverlay> {
        self.overlays.iter().filter(|o| o.is_visible())
    }

    /// The visible overlay drawn on top at a surface point.
    pub fn topmost_at(&self, x: f64, y: f64) -> Option<&RenderedOverlay> {
        self.visible().filter(|o| o.rect.contains(x, y)).last()
    }
}

/// Image resources that failed to load, per overlay.
///
/// A failure is tied to the source that failed: once an overlay's content
/// changes, the new source gets a fresh attempt.
#[derive(Debug, Clone, Default)]
pub struct FailedImages {
    failed: HashSet<(OverlayId, String)>,
}

impl FailedImages {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `src` failed to load for overlay `id`.
    pub fn mark(&mut self, id: OverlayId, src: impl Into<String>) {
        self.failed.insert((id, src.into()));
    }

    pub fn is_failed(&self, id: &OverlayId, src: &str) -> bool {
        self.failed.contains(&(id.clone(), src.to_string()))
    }

    /// Drop failures that no longer match any overlay in `overlays`.
    pub fn retain_current(&mut self, overlays: &[Overlay]) {
        self.failed.retain(|(id, src)| {
            overlays
                .iter()
                .any(|o| &o.id == id && o.kind == OverlayKind::Image && &o.content == src)
        });
    }

    pub fn len(&self) -> usize {
        self.failed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Placement of a single overlay on `surface`.
pub fn overlay_rect(surface: Surface, overlay: &Overlay) -> RenderRect {
    RenderRect {
        left: f64::from(overlay.position.x) * f64::from(surface.width) / 100.0,
        top: f64::from(overlay.position.y) * f64::from(surface.height) / 100.0,
        width: f64::from(overlay.size.width),
        height: f64::from(overlay.size.height),
    }
}

/// Compose every overlay onto `surface`, in list order.
pub fn compose(surface: Surface, overlays: &[Overlay]) -> Scene {
    compose_with_failures(surface, overlays, &FailedImages::default())
}

/// Compose, hiding image overlays whose current source is known to fail.
pub fn compose_with_failures(
    surface: Surface,
    overlays: &[Overlay],
    failed: &FailedImages,
) -> Scene {
    let rendered = overlays
        .iter()
        .enumerate()
        .map(|(z_index, overlay)| {
            let content = match overlay.kind {
                OverlayKind::Text => RenderContent::Text {
                    text: overlay.content.clone(),
                },
                OverlayKind::Image => RenderContent::Image {
                    src: overlay.content.clone(),
                    visible: !failed.is_failed(&overlay.id, &overlay.content),
                },
            };
            RenderedOverlay {
                id: overlay.id.clone(),
                name: overlay.name.clone(),
                rect: overlay_rect(surface, overlay),
                z_index,
                content,
                pointer_events: false,
            }
        })
        .collect::<Vec<_>>();

    tracing::trace!(
        surface_width = surface.width,
        surface_height = surface.height,
        overlays = rendered.len(),
        "Composed scene"
    );

    Scene {
        surface,
        overlays: rendered,
    }
}
