use serde_json::{json, Value};

use stalebot::config::models::{ItemType, ResolvedConfig, DEFAULT_MARK_COMMENT};
use stalebot::config::schema;

fn validate(raw: &Value) -> (ResolvedConfig, Vec<String>) {
    schema::validate("org/repo", raw)
}

// ─── Defaults ───

#[test]
fn defaults() {
    let (config, warnings) = validate(&json!({}));
    assert!(warnings.is_empty());

    for ty in [ItemType::Issues, ItemType::Pulls] {
        assert_eq!(config.days_until_stale(ty), 60.0);
        assert_eq!(config.days_until_close(ty), Some(7.0));
        assert!(config.only_labels(ty).is_empty());
        assert_eq!(
            config.exempt_labels(ty).to_vec(),
            vec!["pinned".to_string(), "security".to_string()]
        );
        assert!(!config.exempt_projects(ty));
        assert!(!config.exempt_milestones(ty));
        assert!(!config.exempt_assignees(ty));
        assert_eq!(config.stale_label(ty), "stale");
        assert_eq!(config.mark_comment(ty), Some(DEFAULT_MARK_COMMENT));
        assert!(config.close_comment(ty).is_none());
        assert!(config.unmark_comment(ty).is_none());
        assert_eq!(config.limit_per_run(ty), 30);
        assert!(config.perform(ty));
    }
    assert!(config.only().is_none());
    assert_eq!(config.repo_name(), "org/repo");
}

#[test]
fn does_not_copy_defaults_into_per_type_overrides() {
    let (config, warnings) = validate(&json!({ "pulls": { "daysUntilStale": 90 } }));
    assert!(warnings.is_empty());

    assert_eq!(config.days_until_stale(ItemType::Pulls), 90.0);
    assert_eq!(config.days_until_stale(ItemType::Issues), 60.0);
    // 오버라이드에 쓰지 않은 필드는 톱레벨 값을 그대로 따른다
    assert_eq!(config.limit_per_run(ItemType::Pulls), 30);
    assert_eq!(config.stale_label(ItemType::Pulls), "stale");

    let (config, _) = validate(&json!({ "issues": { "daysUntilStale": 90 } }));
    assert_eq!(config.days_until_stale(ItemType::Issues), 90.0);
    assert_eq!(config.days_until_stale(ItemType::Pulls), 60.0);
}

// ─── Valid configs ───

#[test]
fn valid_configs_produce_no_warnings() {
    let cases = vec![
        json!({ "daysUntilClose": false }),
        json!({ "daysUntilClose": 1 }),
        json!({ "onlyLabels": ["foo"] }),
        json!({ "onlyLabels": "foo" }),
        json!({ "onlyLabels": null }),
        json!({ "onlyLabels": [] }),
        json!({ "exemptLabels": ["foo"] }),
        json!({ "exemptLabels": "foo" }),
        json!({ "exemptLabels": null }),
        json!({ "exemptLabels": [] }),
        json!({ "exemptProjects": true }),
        json!({ "exemptProjects": false }),
        json!({ "exemptMilestones": true }),
        json!({ "exemptMilestones": false }),
        json!({ "exemptAssignees": true }),
        json!({ "exemptAssignees": false }),
        json!({ "markComment": "stale yo" }),
        json!({ "markComment": false }),
        json!({ "closeComment": "bye" }),
        json!({ "unmarkComment": false }),
        json!({ "limitPerRun": 1 }),
        json!({ "limitPerRun": 30 }),
        json!({ "only": null }),
        json!({ "only": "pulls" }),
        json!({ "only": "issues" }),
        json!({ "pulls": { "daysUntilStale": 2 } }),
        json!({ "issues": { "perform": false } }),
        json!({ "_extends": ".github" }),
        json!({ "_extends": "foobar" }),
    ];

    for case in cases {
        let (_, warnings) = validate(&case);
        assert!(
            warnings.is_empty(),
            "expected no warnings for {case}: {warnings:?}"
        );
    }
}

#[test]
fn single_string_labels_normalize_to_list() {
    let (config, warnings) = validate(&json!({ "onlyLabels": "foo", "exemptLabels": "bar" }));
    assert!(warnings.is_empty());
    assert_eq!(
        config.only_labels(ItemType::Issues).to_vec(),
        vec!["foo".to_string()]
    );
    assert_eq!(
        config.exempt_labels(ItemType::Issues).to_vec(),
        vec!["bar".to_string()]
    );
}

#[test]
fn only_restricts_to_single_type() {
    let (config, warnings) = validate(&json!({ "only": "pulls" }));
    assert!(warnings.is_empty());
    assert_eq!(config.only(), Some(ItemType::Pulls));
}

// ─── Invalid configs ───

#[test]
fn invalid_configs_report_but_still_normalize() {
    let cases: Vec<(Value, &str)> = vec![
        (json!({ "daysUntilClose": true }), "must be a number or false"),
        (json!({ "daysUntilStale": "no" }), "must be a number"),
        (json!({ "exemptProjects": "nope" }), "must be a boolean"),
        (json!({ "exemptMilestones": "nope" }), "must be a boolean"),
        (json!({ "exemptAssignees": "nope" }), "must be a boolean"),
        (json!({ "markComment": true }), "must be a string or false"),
        (json!({ "closeComment": 3 }), "must be a string or false"),
        (
            json!({ "limitPerRun": 31 }),
            "must be an integer between 1 and 30",
        ),
        (
            json!({ "limitPerRun": 0 }),
            "must be an integer between 1 and 30",
        ),
        (
            json!({ "limitPerRun": 0.5 }),
            "must be an integer between 1 and 30",
        ),
        (
            json!({ "only": "donuts" }),
            "must be one of [issues, pulls, null]",
        ),
        (json!({ "pulls": { "daysUntilStale": "no" } }), "must be a number"),
        (json!({ "pulls": { "lol": "nope" } }), "\"lol\" is not allowed"),
        (json!({ "lol": "nope" }), "\"lol\" is not allowed"),
        (json!({ "staleLabel": 7 }), "must be a string"),
        (json!({ "_extends": true }), "must be a string"),
        (json!({ "_extends": false }), "must be a string"),
    ];

    for (case, expected) in cases {
        let (_, warnings) = validate(&case);
        assert!(
            warnings.iter().any(|w| w.contains(expected)),
            "expected '{expected}' for {case}, got {warnings:?}"
        );
    }
}

#[test]
fn invalid_field_keeps_default_value() {
    let (config, warnings) = validate(&json!({ "limitPerRun": 31 }));
    assert_eq!(warnings.len(), 1);
    assert_eq!(config.limit_per_run(ItemType::Issues), 30);

    let (config, _) = validate(&json!({ "only": "donuts" }));
    assert!(config.only().is_none());
}

#[test]
fn non_mapping_config_normalizes_to_defaults() {
    let (config, warnings) = validate(&json!("just a string"));
    assert_eq!(warnings.len(), 1);
    assert!(config.perform(ItemType::Issues));
    assert_eq!(config.limit_per_run(ItemType::Issues), 30);
}

#[test]
fn null_config_is_plain_defaults() {
    let (config, warnings) = validate(&Value::Null);
    assert!(warnings.is_empty());
    assert!(config.perform(ItemType::Issues));
}

#[test]
fn invalid_override_key_does_not_leak_into_config() {
    let (config, warnings) = validate(&json!({ "pulls": { "lol": "nope", "limitPerRun": 5 } }));
    assert_eq!(warnings.len(), 1);
    // 같은 객체의 올바른 키는 정상 반영된다
    assert_eq!(config.limit_per_run(ItemType::Pulls), 5);
    assert_eq!(config.limit_per_run(ItemType::Issues), 30);
}
