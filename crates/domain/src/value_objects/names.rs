//! Validated name newtypes
//!
//! Game names double as directory names and URL path segments, so they are
//! valid by construction:
//! - Non-empty
//! - Within length limits
//! - Trimmed of leading/trailing whitespace
//! - Free of path separators and parent references

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;

/// Maximum length for a game name
const MAX_GAME_NAME_LENGTH: usize = 120;

// ============================================================================
// GameName
// ============================================================================

/// A validated game name (non-empty, <=120 chars, trimmed, path-safe)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GameName(String);

impl GameName {
    /// Create a new validated game name.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if:
    /// - The name is empty after trimming
    /// - The name exceeds 120 characters after trimming
    /// - The name contains `/`, `\`, a NUL byte, or is `.`/`..`
    pub fn new(name: impl Into<String>) -> Result<Self, DomainError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("Game name cannot be empty"));
        }
        if trimmed.len() > MAX_GAME_NAME_LENGTH {
            return Err(DomainError::validation(format!(
                "Game name cannot exceed {} characters",
                MAX_GAME_NAME_LENGTH
            )));
        }
        if trimmed == "." || trimmed == ".." || trimmed.contains(['/', '\\', '\0']) {
            return Err(DomainError::validation(format!(
                "Game name '{}' is not a valid path segment",
                trimmed
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GameName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for GameName {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<GameName> for String {
    fn from(name: GameName) -> String {
        name.0
    }
}

impl AsRef<str> for GameName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn game_name_is_trimmed() {
        let name = GameName::new("  dungeon  ").unwrap();
        assert_eq!(name.as_str(), "dungeon");
    }

    #[test]
    fn game_name_rejects_empty_and_path_like_values() {
        assert!(GameName::new("   ").is_err());
        assert!(GameName::new("..").is_err());
        assert!(GameName::new("a/b").is_err());
        assert!(GameName::new("a\\b").is_err());
        assert!(GameName::new("x".repeat(121)).is_err());
    }

    #[test]
    fn game_name_deserializes_through_validation() {
        let ok: Result<GameName, _> = serde_json::from_str("\"castle\"");
        assert!(ok.is_ok());
        let bad: Result<GameName, _> = serde_json::from_str("\"../etc\"");
        assert!(bad.is_err());
    }
}
