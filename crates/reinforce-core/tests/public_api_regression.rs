use reinforce_core::{
    Distribution, LookupPolicy, SolverConfig, SolverError, StateKey, StateStats, TableSnapshot,
    ValueTable,
};

#[test]
fn public_error_messages_name_the_state() {
    let err = SolverError::MalformedDistribution {
        state: StateKey::from("(1, 2)"),
        distribution: Distribution::Responses {
            action: "Up".to_string(),
        },
        sum: 0.75,
    };
    let message = err.to_string();

    assert!(message.contains("(1, 2)"), "{message}");
    assert!(message.contains("0.75"), "{message}");
    assert!(SolverError::NonEnumerableStateSpace.to_string().contains("enumer"));
}

#[test]
fn public_config_loads_from_a_file() {
    let path = std::env::temp_dir().join(format!("reinforce-config-{}.yaml", std::process::id()));
    std::fs::write(&path, "gamma: 0.95\nmax_episodes: 40\nseed: 3\n").expect("write config");

    let config = SolverConfig::from_yaml_path(&path).expect("load config");
    let _ = std::fs::remove_file(&path);

    assert_eq!(config.gamma, 0.95);
    assert_eq!(config.max_episodes, 40);
    assert_eq!(config.seed, 3);
    assert!(SolverConfig::from_yaml_path("/definitely/not/here.yaml").is_err());
}

#[test]
fn public_snapshot_json_has_stable_shape() {
    let mut table = ValueTable::new();
    table.record(StateKey::from("s"), 4.0);

    let json = table.to_json().expect("serialize");
    let snapshot: TableSnapshot = serde_json::from_str(&json).expect("snapshot json");

    assert_eq!(snapshot.schema_version, 1);
    assert_eq!(snapshot.entry_count, 1);
    assert_eq!(snapshot.entries[0].state_key, StateKey::from("s"));
    assert_eq!(snapshot.entries[0].visits, 1);
    assert!(json.contains("\"state_key\": \"s\""));
}

#[test]
fn public_lookup_policy_serializes_by_state_key() {
    let mut policy = LookupPolicy::new(0.9);
    policy.set_action(StateKey::from("b"), "right".to_string());
    policy.insert(
        StateKey::from("a"),
        vec![("left".to_string(), 0.25), ("right".to_string(), 0.75)],
    );

    let json = serde_json::to_string(&policy).expect("serialize");
    let restored: LookupPolicy<String> = serde_json::from_str(&json).expect("deserialize");

    assert_eq!(restored, policy);
    assert_eq!(restored.action(&StateKey::from("a")), Some(&"right".to_string()));
    assert_eq!(restored.len(), 2);
}

#[test]
fn public_state_stats_are_reachable_from_the_crate_root() {
    let mut table = ValueTable::new();
    table.record(StateKey::from("s"), 4.0);
    table.record(StateKey::from("s"), 2.0);

    let stats: &StateStats = table.get(&StateKey::from("s")).expect("recorded");
    assert_eq!(stats.visits(), 2);
    assert_eq!(stats.value(), 3.0);
    assert_eq!(table.insert(StateKey::from("t"), StateStats::default()), None);
}
