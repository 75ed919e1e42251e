//! Persona selector parsing
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.0.0: Query parameter parsing with default fallback

/// Persona used when the selector is absent, malformed or unknown
pub const DEFAULT_PERSONA_ID: i64 = 1;

/// All persona ids served by the registry
pub const PERSONA_IDS: &[i64] = &[1, 2, 3, 4];

/// Parse the raw `type` query value into a persona id.
///
/// Absent or non-numeric input yields [`DEFAULT_PERSONA_ID`]. Numeric values
/// are returned as-is, even when no persona carries that id.
pub fn parse_selector(raw: Option<&str>) -> i64 {
    raw.and_then(|value| value.trim().parse::<i64>().ok())
        .unwrap_or(DEFAULT_PERSONA_ID)
}

/// Whether a persona id exists in the registry
pub fn is_known_persona(id: i64) -> bool {
    PERSONA_IDS.contains(&id)
}
