//! The overlay create/edit form controller.

use streamlay_common::error::{StreamlayError, StreamlayResult};
use streamlay_overlay_model::{Overlay, OverlayDraft, OverlayId, OverlayKind};
use streamlay_store_client::OverlayStore;

use crate::confirm::ConfirmGate;
use crate::fields::{coerce_position, coerce_size, FormField};

/// Prompt shown before an overlay is deleted.
pub const DELETE_PROMPT: &str = "Are you sure you want to delete this overlay?";

/// What a submit will do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    /// No target record; submit creates a new overlay.
    Create,
    /// Bound to an existing overlay; submit replaces its fields.
    Edit(OverlayId),
}

/// Which write a successful submit performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitAction {
    Created,
    Updated,
}

impl SubmitAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmitAction::Created => "created",
            SubmitAction::Updated => "updated",
        }
    }
}

/// Result of a committed submit.
#[derive(Debug)]
pub struct Submission {
    pub action: SubmitAction,
    /// The record as the store returned it.
    pub overlay: Overlay,
    /// The full list reloaded after the write. The write stands even when
    /// this reload failed.
    pub overlays: StreamlayResult<Vec<Overlay>>,
}

/// Result of a delete request.
#[derive(Debug, Clone)]
pub enum Deletion {
    /// The confirmation gate said no; nothing was sent.
    Declined,
    /// The overlay is gone; holds the reloaded list.
    Deleted(Vec<Overlay>),
}

/// Create/edit form state for a single overlay.
#[derive(Debug, Clone)]
pub struct OverlayForm {
    mode: FormMode,
    draft: OverlayDraft,
    visible: bool,
}

impl Default for OverlayForm {
    fn default() -> Self {
        Self::new()
    }
}

impl OverlayForm {
    /// An empty, hidden form in Create mode.
    pub fn new() -> Self {
        Self {
            mode: FormMode::Create,
            draft: OverlayDraft::default(),
            visible: false,
        }
    }

    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    pub fn draft(&self) -> &OverlayDraft {
        &self.draft
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Show or hide the form without touching its contents.
    pub fn toggle_visibility(&mut self) -> bool {
        self.visible = !self.visible;
        self.visible
    }

    /// Heading for the current mode.
    pub fn title(&self) -> &'static str {
        match self.mode {
            FormMode::Create => "Create New Overlay",
            FormMode::Edit(_) => "Edit Overlay",
        }
    }

    /// Apply raw input to a field.
    ///
    /// Numeric fields never fail: unparseable text takes the field default
    /// and out-of-range values are clamped. Only an unknown overlay type is
    /// rejected.
    pub fn set_field(&mut self, field: FormField, value: &str) -> StreamlayResult<()> {
        match field {
            FormField::Name => self.draft.name = value.to_string(),
            FormField::Content => self.draft.content = value.to_string(),
            FormField::Kind => {
                self.draft.kind = value
                    .parse::<OverlayKind>()
                    .map_err(|e| StreamlayError::invalid_field("type", e.to_string()))?;
            }
            FormField::PositionX => self.draft.position.x = coerce_position(value),
            FormField::PositionY => self.draft.position.y = coerce_position(value),
            FormField::Width => self.draft.size.width = coerce_size(value),
            FormField::Height => self.draft.size.height = coerce_size(value),
        }
        Ok(())
    }

    /// Apply raw input to a field addressed by its input name (`"position.x"`, ...).
    pub fn input(&mut self, name: &str, value: &str) -> StreamlayResult<()> {
        let field = name.parse::<FormField>()?;
        self.set_field(field, value)
    }

    /// Switch to Edit mode, prefilled from `overlay`.
    pub fn begin_edit(&mut self, overlay: &Overlay) {
        tracing::debug!(id = %overlay.id, "Editing overlay");
        self.mode = FormMode::Edit(overlay.id.clone());
        self.draft = overlay.draft();
        self.visible = true;
    }

    /// Drop any edits and return to an empty, hidden Create form.
    pub fn cancel(&mut self) {
        *self = Self::new();
    }

    /// Check the draft can be submitted and return a copy of it.
    pub fn validate(&self) -> StreamlayResult<OverlayDraft> {
        self.draft
            .validate()
            .map_err(|e| StreamlayError::invalid_field(e.field(), e.to_string()))?;
        Ok(self.draft.clone())
    }

    /// Validate, then create or update depending on the mode.
    ///
    /// Once the write commits the form returns to Create and the full list
    /// is reloaded; the reload outcome is carried in [`Submission::overlays`].
    /// If the write fails the form keeps its mode and contents so the user
    /// can retry.
    pub async fn submit(&mut self, store: &dyn OverlayStore) -> StreamlayResult<Submission> {
        let draft = self.validate()?;

        let (action, overlay) = match &self.mode {
            FormMode::Create => (SubmitAction::Created, store.create_overlay(&draft).await?),
            FormMode::Edit(id) => (
                SubmitAction::Updated,
                store.update_overlay(id, &draft).await?,
            ),
        };
        tracing::info!(id = %overlay.id, action = action.as_str(), "Overlay saved");

        self.cancel();
        let overlays = store.list_overlays().await;
        if let Err(e) = &overlays {
            tracing::warn!(error = %e, "Reload after save failed");
        }

        Ok(Submission {
            action,
            overlay,
            overlays,
        })
    }

    /// Delete `id` after the gate approves, then reload the list.
    ///
    /// A 404 from the store means another client already removed it; that
    /// is treated as success and the reload shows the server's view.
    pub async fn delete(
        &mut self,
        store: &dyn OverlayStore,
        id: &OverlayId,
        gate: &dyn ConfirmGate,
    ) -> StreamlayResult<Deletion> {
        if !gate.confirm(DELETE_PROMPT) {
            tracing::debug!(%id, "Delete declined");
            return Ok(Deletion::Declined);
        }

        match store.delete_overlay(id).await {
            Ok(()) => {}
            Err(e) if e.status() == Some(404) => {
                tracing::warn!(%id, "Overlay already deleted on the server");
            }
            Err(e) => return Err(e),
        }

        if self.mode == FormMode::Edit(id.clone()) {
            self.cancel();
        }

        let overlays = store.list_overlays().await?;
        Ok(Deletion::Deleted(overlays))
    }
}
