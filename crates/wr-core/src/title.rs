//! Proposed titles and their stable identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::user::UserId;

/// Surrogate identifier for a title.
///
/// Rolls and pools reference titles by id, so renaming a title touches exactly
/// one record instead of every reference site.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct TitleId(pub Uuid);

impl TitleId {
    /// Generate a new random title ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TitleId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TitleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// A title proposed for a challenge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TitleInfo {
    /// Display name, unique within the challenge. Mutable via rename.
    pub name: String,
    /// Participant who proposed the title.
    pub proposer: UserId,
    /// Optional link to the title's page.
    pub url: Option<String>,
    /// Whether the title has ever been assigned in a round.
    ///
    /// Used titles are immutable history: they cannot be removed and cannot
    /// be handed out again via `set_title`.
    pub is_used: bool,
}

impl TitleInfo {
    /// Create an unused title.
    pub fn new(name: impl Into<String>, proposer: UserId, url: Option<String>) -> Self {
        Self {
            name: name.into(),
            proposer,
            url,
            is_used: false,
        }
    }
}
