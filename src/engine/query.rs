//! 검색 인덱스 쿼리 문자열 조립

use chrono::{DateTime, Utc};

use crate::config::models::{ItemType, ResolvedConfig};

/// mark 대상 검색 쿼리: open + 기준 시각 이전 업데이트 + stale 라벨 미보유 + 면제 조건
pub fn build_stale_query(ty: ItemType, config: &ResolvedConfig, now: DateTime<Utc>) -> String {
    let mut parts = vec![
        format!("repo:{}", config.repo_name()),
        "is:open".to_string(),
        format!("updated:<{}", cutoff(now, config.days_until_stale(ty))),
        format!("-label:\"{}\"", config.stale_label(ty)),
    ];

    for label in config.exempt_labels(ty) {
        parts.push(format!("-label:\"{label}\""));
    }
    // onlyLabels는 AND 의미 — 나열된 라벨을 전부 가진 아이템만 매칭된다
    for label in config.only_labels(ty) {
        parts.push(format!("label:\"{label}\""));
    }

    parts.push(ty.query_restriction().to_string());

    if config.exempt_projects(ty) {
        parts.push("no:project".to_string());
    }
    if config.exempt_milestones(ty) {
        parts.push("no:milestone".to_string());
    }
    if config.exempt_assignees(ty) {
        parts.push("no:assignee".to_string());
    }

    parts.join(" ")
}

/// sweep 대상 검색 쿼리: 이미 stale 라벨이 붙었고 close 유예 기간도 지난 아이템.
/// daysUntilClose가 비활성이면 None.
pub fn build_closable_query(
    ty: ItemType,
    config: &ResolvedConfig,
    now: DateTime<Utc>,
) -> Option<String> {
    let days = config.days_until_close(ty)?;

    let parts = vec![
        format!("repo:{}", config.repo_name()),
        "is:open".to_string(),
        format!("updated:<{}", cutoff(now, days)),
        format!("label:\"{}\"", config.stale_label(ty)),
        ty.query_restriction().to_string(),
    ];

    Some(parts.join(" "))
}

/// now - days 시각. epoch 이전으로는 내려가지 않는다 — 검색 인덱스가 거부한다.
fn cutoff(now: DateTime<Utc>, days: f64) -> String {
    let secs = (days * 86_400.0) as i64;
    let mut date = now - chrono::Duration::seconds(secs);
    if date < DateTime::<Utc>::UNIX_EPOCH {
        date = DateTime::<Utc>::UNIX_EPOCH;
    }
    date.format("%Y-%m-%dT%H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema;
    use chrono::TimeZone;
    use serde_json::json;

    fn config(raw: serde_json::Value) -> ResolvedConfig {
        let (config, warnings) = schema::validate("org/repo", &raw);
        assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
        config
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn pulls_query_restricts_to_prs() {
        let q = build_stale_query(ItemType::Pulls, &config(json!({})), now());
        assert!(q.contains("is:pr"));
        assert!(!q.contains("is:issue"));
    }

    #[test]
    fn issues_query_restricts_to_issues() {
        let q = build_stale_query(ItemType::Issues, &config(json!({})), now());
        assert!(q.contains("is:issue"));
    }

    #[test]
    fn excludes_stale_and_exempt_labels() {
        let q = build_stale_query(
            ItemType::Issues,
            &config(json!({ "exemptLabels": ["wip"] })),
            now(),
        );
        assert!(q.contains("-label:\"stale\""));
        assert!(q.contains("-label:\"wip\""));
        assert!(q.contains("is:open"));
        assert!(q.starts_with("repo:org/repo"));
    }

    #[test]
    fn requires_every_only_label() {
        let q = build_stale_query(
            ItemType::Issues,
            &config(json!({ "onlyLabels": ["a", "b"] })),
            now(),
        );
        assert!(q.contains("label:\"a\""));
        assert!(q.contains("label:\"b\""));
    }

    #[test]
    fn exempt_booleans_gate_no_terms() {
        let q = build_stale_query(
            ItemType::Issues,
            &config(json!({
                "exemptProjects": true,
                "exemptMilestones": true,
                "exemptAssignees": true,
            })),
            now(),
        );
        assert!(q.contains("no:project"));
        assert!(q.contains("no:milestone"));
        assert!(q.contains("no:assignee"));

        let q = build_stale_query(ItemType::Issues, &config(json!({})), now());
        assert!(!q.contains("no:project"));
        assert!(!q.contains("no:milestone"));
        assert!(!q.contains("no:assignee"));
    }

    #[test]
    fn cutoff_reflects_days_until_stale() {
        let q = build_stale_query(
            ItemType::Issues,
            &config(json!({ "daysUntilStale": 1 })),
            now(),
        );
        assert!(q.contains("updated:<2024-05-31T12:00:00"));
    }

    #[test]
    fn cutoff_clamps_to_epoch() {
        let early = Utc.with_ymd_and_hms(1970, 1, 10, 0, 0, 0).unwrap();
        assert_eq!(cutoff(early, 60.0), "1970-01-01T00:00:00");
    }

    #[test]
    fn closable_query_targets_marked_items() {
        let q = build_closable_query(ItemType::Pulls, &config(json!({})), now()).unwrap();
        assert!(q.contains("label:\"stale\""));
        assert!(!q.contains("-label:"));
        assert!(q.contains("is:pr"));
        // 기본 7일 유예
        assert!(q.contains("updated:<2024-05-25T12:00:00"));
    }

    #[test]
    fn closable_query_disabled_by_false() {
        let cfg = config(json!({ "daysUntilClose": false }));
        assert!(build_closable_query(ItemType::Pulls, &cfg, now()).is_none());
    }
}
