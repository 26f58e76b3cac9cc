//! Guild users and their display attributes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Color assigned to users who never picked one.
pub const DEFAULT_COLOR: &str = "#FFFFFF";

/// Stable numeric identifier of a guild user.
///
/// The id is assigned by the chat platform and shared across every challenge
/// in the guild; renames change only the [`UserInfo`] it points at.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Display attributes of a guild user.
///
/// Created on first reference and never deleted, so historical challenges can
/// always resolve a name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    /// Display name.
    pub name: String,
    /// Hex color used when rendering the user (`#RRGGBB`).
    pub color: String,
}

impl UserInfo {
    /// Create a user with the default color.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: DEFAULT_COLOR.to_string(),
        }
    }
}
