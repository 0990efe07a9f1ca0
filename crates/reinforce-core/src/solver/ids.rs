use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical identity of a state, derived from its content.
/// Used for equality, hashing, table lookup and persistence alike, so it must be
/// deterministic and must not depend on object identity or search metadata.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateKey(String);

impl StateKey {
    /// Borrow the textual form of this key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for StateKey {
    fn from(value: &str) -> Self {
        StateKey(value.to_string())
    }
}

impl From<String> for StateKey {
    fn from(value: String) -> Self {
        StateKey(value)
    }
}

impl From<u64> for StateKey {
    /// Allow for explicit conversion from a dense numeric id.
    fn from(value: u64) -> Self {
        StateKey(value.to_string())
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A wrapper for an integer index into a state's action enumeration order
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActionId(usize);

impl ActionId {
    /// Get the position of the action in the enumeration order
    pub fn index(&self) -> usize {
        self.0
    }
}

impl From<usize> for ActionId {
    fn from(value: usize) -> Self {
        ActionId(value)
    }
}

/// Identity of the acting party that chose an action.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(usize);

impl AgentId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl From<usize> for AgentId {
    fn from(value: usize) -> Self {
        AgentId(value)
    }
}
