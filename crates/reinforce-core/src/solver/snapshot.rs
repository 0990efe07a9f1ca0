use serde::{Deserialize, Serialize};

use crate::solver::ids::StateKey;

pub const TABLE_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSnapshot {
    pub schema_version: u32,
    pub entry_count: usize,
    pub entries: Vec<EntrySnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntrySnapshot {
    pub state_key: StateKey,
    pub value_sum: f64,
    pub visits: u64,
    pub value: f64,
}
