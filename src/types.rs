/// Shared types used across the codebase

use serde::{Deserialize, Serialize};

/// Repository operations, used to label requests in logs and to build the
/// fallback message shown when the server gives none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    List,
    Get,
    Create,
    Update,
    Delete,
}

impl Action {
    pub fn verb(&self) -> &'static str {
        match self {
            Action::List => "load",
            Action::Get => "load",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }

    /// `"Failed to delete role"`, `"Failed to load organizations"`
    pub fn fallback_message(&self, singular: &str, plural: &str) -> String {
        let noun = match self {
            Action::List => plural,
            _ => singular,
        };
        format!("Failed to {} {}", self.verb(), noun)
    }
}
