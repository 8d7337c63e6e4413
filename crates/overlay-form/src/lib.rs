//! Streamlay Overlay Form
//!
//! Form state for creating and editing overlays:
//! - **Fields:** Name-addressed inputs with integer coercion for geometry
//! - **Form:** Create/Edit modes, validation, and submission through an
//!   [`OverlayStore`](streamlay_store_client::OverlayStore)
//! - **Confirm:** The yes/no gate every deletion passes through
//!
//! After every successful write the full overlay list is reloaded from the
//! store, so callers only ever see server-confirmed snapshots.

pub mod confirm;
pub mod fields;
pub mod form;

pub use confirm::ConfirmGate;
pub use fields::*;
pub use form::*;
