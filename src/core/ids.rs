//! Session identifier newtype.
//!
//! Session ids are opaque: any string (including the empty string) names a
//! conversation, and no format is enforced. Distinct ids never share state.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Session id used when a request does not name one.
pub const DEFAULT_SESSION_ID: &str = "default";

/// Opaque conversation identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Resolve an optional identifier, falling back to [`DEFAULT_SESSION_ID`].
    #[must_use]
    pub fn resolve(value: Option<String>) -> Self {
        value.map_or_else(Self::default, Self)
    }

    /// Borrow the raw identifier.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self(DEFAULT_SESSION_ID.to_string())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    #[inline]
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for SessionId {
    #[inline]
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_defaults_when_absent() {
        assert_eq!(SessionId::resolve(None).as_str(), DEFAULT_SESSION_ID);
        assert_eq!(SessionId::resolve(Some("abc".to_string())).as_str(), "abc");
    }

    #[test]
    fn test_empty_id_is_kept_opaque() {
        assert_eq!(SessionId::resolve(Some(String::new())).as_str(), "");
    }

    #[test]
    fn test_serde_is_transparent() {
        let id = SessionId::from("room-1");
        let json = serde_json::to_string(&id).unwrap_or_default();
        assert_eq!(json, "\"room-1\"");
    }
}
