use std::io::Cursor;

use crate::{StateKey, StateStats, TableError, TableSnapshot, ValueTable};

fn sample_table() -> ValueTable {
    let mut table = ValueTable::new();
    table.record(StateKey::from("(0, 1)"), 3.0);
    table.record(StateKey::from("(0, 1)"), 0.5);
    table.record(StateKey::from("goal"), -2.25);
    table.set_value(StateKey::from("solved"), 7.125);
    table
}

#[test]
fn unseen_states_read_as_zero() {
    let table = sample_table();
    assert_eq!(table.value(&StateKey::from("nowhere")), 0.0);
    assert!(!table.contains(&StateKey::from("nowhere")));
}

#[test]
fn record_keeps_running_average() {
    let table = sample_table();
    let stats = table.get(&StateKey::from("(0, 1)")).expect("recorded");

    assert_eq!(stats.visits(), 2);
    assert_eq!(stats.value_sum(), 3.5);
    assert_eq!(stats.value(), 1.75);
}

#[test]
fn set_value_leaves_return_statistics_alone() {
    let table = sample_table();
    let stats = table.get(&StateKey::from("solved")).expect("written");
    assert!(stats.is_unvisited());
    assert_eq!(stats.value(), 7.125);
}

#[test]
fn line_records_survive_a_round_trip() {
    let table = sample_table();
    let mut buffer = Vec::new();
    table.write_records(&mut buffer).expect("write");

    let text = String::from_utf8(buffer.clone()).expect("utf8");
    assert!(text.contains("(0, 1), 3.5, 2, 1.75\n"));

    let restored = ValueTable::read_records(Cursor::new(buffer)).expect("read");
    assert_eq!(restored, table);
}

#[test]
fn blank_lines_are_skipped() {
    let text = "a, 1, 1, 1\n\n   \nb, 4, 2, 2\n";
    let table = ValueTable::read_records(Cursor::new(text)).expect("read");
    assert_eq!(table.len(), 2);
    assert_eq!(table.value(&StateKey::from("b")), 2.0);
}

#[test]
fn malformed_record_reports_its_line() {
    let text = "a, 1, 1, 1\nb, two, 1, 1\n";
    let err = ValueTable::read_records(Cursor::new(text)).expect_err("bad sum");
    assert!(matches!(err, TableError::Parse { line: 2, .. }), "{err}");

    let err = ValueTable::read_records(Cursor::new("only, three, fields")).expect_err("short");
    assert!(matches!(err, TableError::Parse { line: 1, .. }));
}

#[test]
fn duplicate_keys_are_rejected_on_read() {
    let text = "a, 1, 1, 1\na, 2, 1, 2\n";
    let err = ValueTable::read_records(Cursor::new(text)).expect_err("duplicate");
    assert!(matches!(err, TableError::Parse { line: 2, .. }));
}

#[test]
fn keys_with_line_breaks_cannot_be_written() {
    let mut table = ValueTable::new();
    table.insert(StateKey::from("two\nlines"), StateStats::from_parts(1.0, 1, 1.0));

    let err = table.write_records(Vec::new()).expect_err("line break");
    assert!(matches!(err, TableError::InvalidKey { .. }));
}

#[test]
fn invalid_key_stops_the_write_before_any_line() {
    let mut table = ValueTable::new();
    table.set_value(StateKey::from("a"), 1.0);
    table.set_value(StateKey::from("b\rc"), 2.0);

    let mut buffer = Vec::new();
    let err = table.write_records(&mut buffer).expect_err("line break");
    assert!(matches!(err, TableError::InvalidKey { ref key } if key.as_str() == "b\rc"));
    assert!(buffer.is_empty());

    let path = std::env::temp_dir().join(format!("reinforce-bad-key-{}.csv", std::process::id()));
    let _ = std::fs::remove_file(&path);
    assert!(table.save(&path).is_err());
    assert!(!path.exists());
}

#[test]
fn json_snapshot_round_trips() {
    let table = sample_table();
    let json = table.to_json().expect("serialize");
    let snapshot = table.snapshot();

    assert_eq!(snapshot.entry_count, 3);
    assert_eq!(snapshot.entries[0].state_key, StateKey::from("(0, 1)"));
    assert_eq!(ValueTable::from_json(&json).expect("deserialize"), table);
}

fn json_with(edit: impl FnOnce(&mut TableSnapshot)) -> String {
    let mut snapshot = sample_table().snapshot();
    edit(&mut snapshot);
    serde_json::to_string(&snapshot).expect("serialize")
}

#[test]
fn snapshot_from_another_schema_version_is_rejected() {
    let json = json_with(|snapshot| snapshot.schema_version = 2);
    let err = ValueTable::from_json(&json).expect_err("version");
    assert!(matches!(err, TableError::Snapshot { .. }), "{err}");
}

#[test]
fn snapshot_entry_count_must_match_its_entries() {
    let json = json_with(|snapshot| snapshot.entry_count = 5);
    let err = ValueTable::from_json(&json).expect_err("count");
    assert!(matches!(err, TableError::Snapshot { .. }), "{err}");

    let json = json_with(|snapshot| {
        let first = snapshot.entries[0].clone();
        snapshot.entries.push(first);
        snapshot.entry_count += 1;
    });
    let err = ValueTable::from_json(&json).expect_err("duplicate");
    assert!(matches!(err, TableError::Snapshot { .. }), "{err}");
}

#[test]
fn files_round_trip_through_save_and_load() {
    let table = sample_table();
    let path = std::env::temp_dir().join(format!("reinforce-table-{}.csv", std::process::id()));

    table.save(&path).expect("save");
    let restored = ValueTable::load(&path).expect("load");
    let _ = std::fs::remove_file(&path);

    assert_eq!(restored, table);
}
