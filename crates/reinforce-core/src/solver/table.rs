use std::{
    collections::{BTreeMap, btree_map},
    fmt, fs,
    io::{self, BufRead, BufReader, BufWriter, Write},
    path::Path,
};

use crate::solver::{
    ids::StateKey,
    snapshot::{EntrySnapshot, TABLE_SCHEMA_VERSION, TableSnapshot},
    stats::StateStats,
};

/// Map from state key to value estimate, shared by every algorithm.
///
/// States that were never written read as 0. Entries are ordered by key so
/// persisted output is deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueTable {
    entries: BTreeMap<StateKey, StateStats>,
}

impl ValueTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Value estimate for `key`, 0 when the state was never seen.
    pub fn value(&self, key: &StateKey) -> f64 {
        self.entries.get(key).map_or(0.0, StateStats::value)
    }

    pub fn get(&self, key: &StateKey) -> Option<&StateStats> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &StateKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Overwrite the estimate of `key`.
    pub fn set_value(&mut self, key: StateKey, value: f64) {
        self.entries.entry(key).or_default().set_value(value);
    }

    /// Add one observed return for `key`.
    pub fn record(&mut self, key: StateKey, sample_return: f64) {
        self.entries.entry(key).or_default().record(sample_return);
    }

    pub fn insert(&mut self, key: StateKey, stats: StateStats) -> Option<StateStats> {
        self.entries.insert(key, stats)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, StateKey, StateStats> {
        self.entries.iter()
    }

    /// Largest absolute value difference against `other` over the union of keys.
    pub fn max_abs_diff(&self, other: &ValueTable) -> f64 {
        self.entries
            .keys()
            .chain(other.entries.keys())
            .map(|key| (self.value(key) - other.value(key)).abs())
            .fold(0.0, f64::max)
    }

    /// Write one `state-key, cumulative-return, visit-count, average` line per entry.
    /// Fails before writing anything if a key cannot be represented on one line.
    pub fn write_records<W: Write>(&self, mut writer: W) -> Result<(), TableError> {
        self.check_keys()?;
        for (key, stats) in &self.entries {
            writeln!(
                writer,
                "{}, {}, {}, {}",
                key,
                stats.value_sum(),
                stats.visits(),
                stats.value()
            )?;
        }
        writer.flush()?;
        Ok(())
    }

    fn check_keys(&self) -> Result<(), TableError> {
        match self
            .entries
            .keys()
            .find(|key| key.as_str().contains(['\n', '\r']))
        {
            Some(key) => Err(TableError::InvalidKey { key: key.clone() }),
            None => Ok(()),
        }
    }

    /// Read lines produced by `write_records`. Blank lines are skipped.
    /// The key is everything before the last three commas, so keys may contain commas.
    pub fn read_records<R: BufRead>(reader: R) -> Result<Self, TableError> {
        let mut table = ValueTable::new();

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let line_no = idx + 1;
            if line.trim().is_empty() {
                continue;
            }

            let mut fields = line.rsplitn(4, ',');
            let (Some(value), Some(visits), Some(value_sum), Some(key)) =
                (fields.next(), fields.next(), fields.next(), fields.next())
            else {
                return Err(TableError::Parse {
                    line: line_no,
                    reason: "expected 4 comma separated fields".to_string(),
                });
            };

            let value_sum = parse_field::<f64>(value_sum, line_no, "cumulative return")?;
            let visits = parse_field::<u64>(visits, line_no, "visit count")?;
            let value = parse_field::<f64>(value, line_no, "average")?;

            let key = StateKey::from(key);
            if table.contains(&key) {
                return Err(TableError::Parse {
                    line: line_no,
                    reason: format!("duplicate state key '{key}'"),
                });
            }
            table.insert(key, StateStats::from_parts(value_sum, visits, value));
        }

        Ok(table)
    }

    /// Persist the table to `path` in the line format.
    /// Nothing is created when a key cannot be persisted.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), TableError> {
        self.check_keys()?;
        let file = fs::File::create(path)?;
        self.write_records(BufWriter::new(file))
    }

    /// Load a table persisted with `save`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TableError> {
        let file = fs::File::open(path)?;
        Self::read_records(BufReader::new(file))
    }

    pub fn snapshot(&self) -> TableSnapshot {
        TableSnapshot {
            schema_version: TABLE_SCHEMA_VERSION,
            entry_count: self.entries.len(),
            entries: self
                .entries
                .iter()
                .map(|(key, stats)| EntrySnapshot {
                    state_key: key.clone(),
                    value_sum: stats.value_sum(),
                    visits: stats.visits(),
                    value: stats.value(),
                })
                .collect(),
        }
    }

    /// Rebuild a table, rejecting unknown schema versions and inconsistent counts.
    pub fn from_snapshot(snapshot: TableSnapshot) -> Result<Self, TableError> {
        if snapshot.schema_version != TABLE_SCHEMA_VERSION {
            return Err(TableError::Snapshot {
                reason: format!(
                    "unsupported schema version {}, expected {TABLE_SCHEMA_VERSION}",
                    snapshot.schema_version
                ),
            });
        }
        if snapshot.entry_count != snapshot.entries.len() {
            return Err(TableError::Snapshot {
                reason: format!(
                    "entry_count is {} but {} entries are present",
                    snapshot.entry_count,
                    snapshot.entries.len()
                ),
            });
        }

        let entries: BTreeMap<_, _> = snapshot
            .entries
            .into_iter()
            .map(|entry| {
                (
                    entry.state_key,
                    StateStats::from_parts(entry.value_sum, entry.visits, entry.value),
                )
            })
            .collect();
        if entries.len() != snapshot.entry_count {
            return Err(TableError::Snapshot {
                reason: "duplicate state keys".to_string(),
            });
        }
        Ok(ValueTable { entries })
    }

    pub fn to_json(&self) -> Result<String, TableError> {
        Ok(serde_json::to_string_pretty(&self.snapshot())?)
    }

    pub fn from_json(json: &str) -> Result<Self, TableError> {
        let snapshot: TableSnapshot = serde_json::from_str(json)?;
        Self::from_snapshot(snapshot)
    }
}

impl<'a> IntoIterator for &'a ValueTable {
    type Item = (&'a StateKey, &'a StateStats);
    type IntoIter = btree_map::Iter<'a, StateKey, StateStats>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

fn parse_field<T: std::str::FromStr>(raw: &str, line: usize, name: &str) -> Result<T, TableError> {
    raw.trim().parse::<T>().map_err(|_| TableError::Parse {
        line,
        reason: format!("invalid {name} '{}'", raw.trim()),
    })
}

/// Error type for value-table persistence.
#[derive(Debug)]
pub enum TableError {
    Io(io::Error),
    Json(serde_json::Error),
    Parse { line: usize, reason: String },
    /// Keys containing line breaks cannot be written in the line format.
    InvalidKey { key: StateKey },
    /// A snapshot is from another schema version or is internally inconsistent.
    Snapshot { reason: String },
}

impl From<io::Error> for TableError {
    fn from(err: io::Error) -> Self {
        TableError::Io(err)
    }
}

impl From<serde_json::Error> for TableError {
    fn from(err: serde_json::Error) -> Self {
        TableError::Json(err)
    }
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableError::Io(err) => write!(f, "value table io failed: {err}"),
            TableError::Json(err) => write!(f, "value table json failed: {err}"),
            TableError::Parse { line, reason } => {
                write!(f, "malformed value table record on line {line}: {reason}")
            }
            TableError::InvalidKey { key } => {
                write!(f, "state key {key:?} cannot be persisted")
            }
            TableError::Snapshot { reason } => write!(f, "invalid value table snapshot: {reason}"),
        }
    }
}

impl std::error::Error for TableError {}
