//! Overlay entities and drafts.
//!
//! An overlay starts life as an [`OverlayDraft`] (no id) and becomes an
//! [`Overlay`] once the store has persisted it and assigned an [`OverlayId`].

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Opaque overlay identifier assigned by the store.
///
/// The wire format is usually a string (e.g. a database object id) but some
/// backends hand out numeric ids, so both decode into the same value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct OverlayId(String);

impl OverlayId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OverlayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OverlayId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for OverlayId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl<'de> Deserialize<'de> for OverlayId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Unsigned(u64),
            Signed(i64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => OverlayId(s),
            RawId::Unsigned(n) => OverlayId(n.to_string()),
            RawId::Signed(n) => OverlayId(n.to_string()),
        })
    }
}

/// What an overlay shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlayKind {
    /// `content` is literal text.
    #[default]
    Text,
    /// `content` is an image URL.
    Image,
}

impl OverlayKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverlayKind::Text => "text",
            OverlayKind::Image => "image",
        }
    }
}

impl fmt::Display for OverlayKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OverlayKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(OverlayKind::Text),
            "image" => Ok(OverlayKind::Image),
            other => Err(ModelError::UnknownKind(other.to_string())),
        }
    }
}

/// Top-left anchor of an overlay, as integer percentages of the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// Valid range for both axes.
    pub const RANGE: RangeInclusive<i32> = 0..=100;

    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Clamp both axes into [`Position::RANGE`].
    pub fn clamped(self) -> Self {
        Self {
            x: self.x.clamp(*Self::RANGE.start(), *Self::RANGE.end()),
            y: self.y.clamp(*Self::RANGE.start(), *Self::RANGE.end()),
        }
    }

    pub fn in_range(&self) -> bool {
        Self::RANGE.contains(&self.x) && Self::RANGE.contains(&self.y)
    }
}

impl Default for Position {
    fn default() -> Self {
        Self { x: 10, y: 10 }
    }
}

/// Overlay box size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    /// Valid range for both dimensions.
    pub const RANGE: RangeInclusive<i32> = 10..=500;

    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Clamp both dimensions into [`Size::RANGE`].
    pub fn clamped(self) -> Self {
        Self {
            width: self.width.clamp(*Self::RANGE.start(), *Self::RANGE.end()),
            height: self.height.clamp(*Self::RANGE.start(), *Self::RANGE.end()),
        }
    }

    pub fn in_range(&self) -> bool {
        Self::RANGE.contains(&self.width) && Self::RANGE.contains(&self.height)
    }
}

impl Default for Size {
    fn default() -> Self {
        Self {
            width: 100,
            height: 40,
        }
    }
}

/// Editable overlay fields, as sent to the store on create and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayDraft {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: OverlayKind,
    pub content: String,
    pub position: Position,
    pub size: Size,
}

impl Default for OverlayDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            kind: OverlayKind::Text,
            content: String::new(),
            position: Position::default(),
            size: Size::default(),
        }
    }
}

impl OverlayDraft {
    /// Check the draft is fit for submission.
    ///
    /// Name and content must contain something other than whitespace, and
    /// position and size must sit inside their ranges.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.name.trim().is_empty() {
            return Err(ModelError::MissingName);
        }
        if self.content.trim().is_empty() {
            return Err(ModelError::MissingContent);
        }
        if !self.position.in_range() {
            return Err(ModelError::PositionOutOfRange(self.position));
        }
        if !self.size.in_range() {
            return Err(ModelError::SizeOutOfRange(self.size));
        }
        Ok(())
    }
}

/// A persisted overlay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Overlay {
    pub id: OverlayId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: OverlayKind,
    pub content: String,
    pub position: Position,
    pub size: Size,

    /// Server-side creation time, when the backend reports one.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_timestamp"
    )]
    pub created_at: Option<DateTime<Utc>>,

    /// Server-side last update time, when the backend reports one.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_timestamp"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Overlay {
    /// Build the persisted form of a draft once the store has assigned an id.
    pub fn from_draft(id: OverlayId, draft: OverlayDraft) -> Self {
        Self {
            id,
            name: draft.name,
            kind: draft.kind,
            content: draft.content,
            position: draft.position,
            size: draft.size,
            created_at: None,
            updated_at: None,
        }
    }

    /// The editable fields of this overlay.
    pub fn draft(&self) -> OverlayDraft {
        OverlayDraft {
            name: self.name.clone(),
            kind: self.kind,
            content: self.content.clone(),
            position: self.position,
            size: self.size,
        }
    }

    /// Replace every editable field, keeping id and timestamps.
    pub fn apply(&mut self, draft: OverlayDraft) {
        self.name = draft.name;
        self.kind = draft.kind;
        self.content = draft.content;
        self.position = draft.position;
        self.size = draft.size;
    }

    /// One-line description used in listings and debug panels.
    pub fn summary(&self) -> String {
        format!(
            "{} - {} at ({}%, {}%) - Size: {}x{}",
            self.name,
            self.kind,
            self.position.x,
            self.position.y,
            self.size.width,
            self.size.height
        )
    }
}

/// Accepts RFC 3339 and RFC 2822 timestamps; anything else decodes as `None`.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    let Some(serde_json::Value::String(text)) = raw else {
        return Ok(None);
    };
    let parsed = DateTime::parse_from_rfc3339(&text)
        .or_else(|_| DateTime::parse_from_rfc2822(&text))
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            // Naive ISO timestamps (no offset) are taken as UTC.
            chrono::NaiveDateTime::parse_from_str(&text, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        });
    Ok(parsed)
}

/// Model-level validation failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("Name is required")]
    MissingName,

    #[error("Content is required")]
    MissingContent,

    #[error("Position ({}%, {}%) is outside 0-100", .0.x, .0.y)]
    PositionOutOfRange(Position),

    #[error("Size {}x{} is outside 10-500 px", .0.width, .0.height)]
    SizeOutOfRange(Size),

    #[error("Unknown overlay type: {0:?} (expected \"text\" or \"image\")")]
    UnknownKind(String),
}

impl ModelError {
    /// Name of the draft field the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            ModelError::MissingName => "name",
            ModelError::MissingContent => "content",
            ModelError::PositionOutOfRange(_) => "position",
            ModelError::SizeOutOfRange(_) => "size",
            ModelError::UnknownKind(_) => "type",
        }
    }
}
