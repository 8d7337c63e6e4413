//! Form field names and numeric coercion.
//!
//! Geometry inputs arrive as free text. They are parsed like a browser
//! `parseInt`: leading whitespace, an optional sign, then as many decimal
//! digits as follow. Text with no leading integer falls back to a per-field
//! default, and the result is clamped into the field's range, so an
//! `OverlayDraft` built from form input is always in range.

use std::fmt;
use std::str::FromStr;

use streamlay_common::error::StreamlayError;
use streamlay_overlay_model::{Position, Size};

/// Substituted when a position input has no leading integer.
pub const POSITION_FALLBACK: i32 = 0;

/// Substituted when a size input has no leading integer.
pub const SIZE_FALLBACK: i32 = 50;

/// An addressable input of the overlay form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    Name,
    Kind,
    Content,
    PositionX,
    PositionY,
    Width,
    Height,
}

impl FormField {
    pub const ALL: [FormField; 7] = [
        FormField::Name,
        FormField::Kind,
        FormField::Content,
        FormField::PositionX,
        FormField::PositionY,
        FormField::Width,
        FormField::Height,
    ];

    /// Input name, as used by the wire format (`position.x`, `size.width`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            FormField::Name => "name",
            FormField::Kind => "type",
            FormField::Content => "content",
            FormField::PositionX => "position.x",
            FormField::PositionY => "position.y",
            FormField::Width => "size.width",
            FormField::Height => "size.height",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            FormField::PositionX | FormField::PositionY | FormField::Width | FormField::Height
        )
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormField {
    type Err = StreamlayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FormField::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| StreamlayError::validation(format!("Unknown form field: {s:?}")))
    }
}

/// Parse the leading decimal integer of `input`, `parseInt`-style.
///
/// Returns `None` when no digit follows the optional sign. Values beyond
/// the `i32` range saturate.
pub fn parse_leading_int(input: &str) -> Option<i32> {
    let trimmed = input.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let mut value: i64 = 0;
    let mut seen_digit = false;
    for byte in digits.bytes() {
        if !byte.is_ascii_digit() {
            break;
        }
        seen_digit = true;
        value = value
            .saturating_mul(10)
            .saturating_add(i64::from(byte - b'0'))
            .min(i64::from(i32::MAX) + 1);
    }

    if !seen_digit {
        return None;
    }
    let value = if negative { -value } else { value };
    Some(value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32)
}

/// Coerce a position input into `[0, 100]`, defaulting to [`POSITION_FALLBACK`].
pub fn coerce_position(input: &str) -> i32 {
    let value = parse_leading_int(input).unwrap_or(POSITION_FALLBACK);
    value.clamp(*Position::RANGE.start(), *Position::RANGE.end())
}

/// Coerce a size input into `[10, 500]`, defaulting to [`SIZE_FALLBACK`].
pub fn coerce_size(input: &str) -> i32 {
    let value = parse_leading_int(input).unwrap_or(SIZE_FALLBACK);
    value.clamp(*Size::RANGE.start(), *Size::RANGE.end())
}
