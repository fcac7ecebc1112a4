//! 설정 문서 검증 + 정규화.
//!
//! 검증은 실패하지 않는다: 잘못된 값은 경고 메시지로 수집하고
//! 해당 필드는 기본값을 유지한 채 항상 정규화된 설정을 반환한다.
//! 런을 중단할지 여부는 호출자가 결정하지 않는다 — 경고를 로깅하고 계속 진행한다.

use serde_json::Value;

use super::models::{ItemType, ResolvedConfig, StaleSettings, TypeOverride};

/// raw 설정 Value → (정규화된 설정, 검증 경고 목록)
pub fn validate(repo_name: &str, raw: &Value) -> (ResolvedConfig, Vec<String>) {
    let mut warnings = Vec::new();
    let mut base = StaleSettings::default();
    let mut issues = TypeOverride::default();
    let mut pulls = TypeOverride::default();
    let mut only = None;

    let map = match raw.as_object() {
        Some(m) => m,
        None => {
            if !raw.is_null() {
                warnings.push("config must be a mapping".to_string());
            }
            return (
                ResolvedConfig::new(repo_name.to_string(), base, issues, pulls, only),
                warnings,
            );
        }
    };

    for (key, value) in map {
        match key.as_str() {
            "issues" => apply_override(&mut issues, "issues", value, &mut warnings),
            "pulls" => apply_override(&mut pulls, "pulls", value, &mut warnings),
            "only" => only = parse_only(value, &mut warnings),
            // 설정 문서 상속은 조회 단계의 관심사 — 타입만 확인하고 소비하지 않는다
            "_extends" => {
                if !value.is_string() {
                    warnings.push("\"_extends\" must be a string".to_string());
                }
            }
            _ => {
                if !apply_field(&mut base, key, value, &mut warnings) {
                    warnings.push(format!("\"{key}\" is not allowed"));
                }
            }
        }
    }

    (
        ResolvedConfig::new(repo_name.to_string(), base, issues, pulls, only),
        warnings,
    )
}

/// 톱레벨 필드 적용. 알려진 키면 true (값이 틀려도 경고만 남기고 true).
fn apply_field(
    base: &mut StaleSettings,
    key: &str,
    value: &Value,
    warnings: &mut Vec<String>,
) -> bool {
    match key {
        "daysUntilStale" => {
            if let Some(n) = parse_number(key, value, warnings) {
                base.days_until_stale = n;
            }
        }
        "daysUntilClose" => {
            if let Some(v) = parse_number_or_false(key, value, warnings) {
                base.days_until_close = v;
            }
        }
        "onlyLabels" => {
            if let Some(labels) = parse_label_list(key, value, warnings) {
                base.only_labels = labels;
            }
        }
        "exemptLabels" => {
            if let Some(labels) = parse_label_list(key, value, warnings) {
                base.exempt_labels = labels;
            }
        }
        "exemptProjects" => {
            if let Some(b) = parse_bool(key, value, warnings) {
                base.exempt_projects = b;
            }
        }
        "exemptMilestones" => {
            if let Some(b) = parse_bool(key, value, warnings) {
                base.exempt_milestones = b;
            }
        }
        "exemptAssignees" => {
            if let Some(b) = parse_bool(key, value, warnings) {
                base.exempt_assignees = b;
            }
        }
        "staleLabel" => {
            if let Some(s) = parse_string(key, value, warnings) {
                base.stale_label = s;
            }
        }
        "markComment" => {
            if let Some(v) = parse_comment(key, value, warnings) {
                base.mark_comment = v;
            }
        }
        "unmarkComment" => {
            if let Some(v) = parse_comment(key, value, warnings) {
                base.unmark_comment = v;
            }
        }
        "closeComment" => {
            if let Some(v) = parse_comment(key, value, warnings) {
                base.close_comment = v;
            }
        }
        "limitPerRun" => {
            if let Some(n) = parse_limit(key, value, warnings) {
                base.limit_per_run = n;
            }
        }
        "perform" => {
            if let Some(b) = parse_bool(key, value, warnings) {
                base.perform = b;
            }
        }
        _ => return false,
    }
    true
}

/// 타입별 오버라이드 객체 적용. 사용자가 쓴 키만 Some으로 채운다.
fn apply_override(ov: &mut TypeOverride, ty: &str, value: &Value, warnings: &mut Vec<String>) {
    let map = match value.as_object() {
        Some(m) => m,
        None => {
            warnings.push(format!("\"{ty}\" must be a mapping"));
            return;
        }
    };

    for (key, value) in map {
        match key.as_str() {
            "daysUntilStale" => ov.days_until_stale = parse_number(key, value, warnings),
            "daysUntilClose" => ov.days_until_close = parse_number_or_false(key, value, warnings),
            "onlyLabels" => ov.only_labels = parse_label_list(key, value, warnings),
            "exemptLabels" => ov.exempt_labels = parse_label_list(key, value, warnings),
            "exemptProjects" => ov.exempt_projects = parse_bool(key, value, warnings),
            "exemptMilestones" => ov.exempt_milestones = parse_bool(key, value, warnings),
            "exemptAssignees" => ov.exempt_assignees = parse_bool(key, value, warnings),
            "staleLabel" => ov.stale_label = parse_string(key, value, warnings),
            "markComment" => ov.mark_comment = parse_comment(key, value, warnings),
            "unmarkComment" => ov.unmark_comment = parse_comment(key, value, warnings),
            "closeComment" => ov.close_comment = parse_comment(key, value, warnings),
            "limitPerRun" => ov.limit_per_run = parse_limit(key, value, warnings),
            "perform" => ov.perform = parse_bool(key, value, warnings),
            _ => warnings.push(format!("\"{key}\" is not allowed in \"{ty}\"")),
        }
    }
}

fn parse_number(key: &str, value: &Value, warnings: &mut Vec<String>) -> Option<f64> {
    match value.as_f64() {
        Some(n) if n >= 0.0 => Some(n),
        _ => {
            if !value.is_null() {
                warnings.push(format!("\"{key}\" must be a number"));
            }
            None
        }
    }
}

fn parse_number_or_false(
    key: &str,
    value: &Value,
    warnings: &mut Vec<String>,
) -> Option<Option<f64>> {
    match value {
        Value::Bool(false) => Some(None),
        Value::Null => None,
        v => match v.as_f64() {
            Some(n) if n >= 0.0 => Some(Some(n)),
            _ => {
                warnings.push(format!("\"{key}\" must be a number or false"));
                None
            }
        },
    }
}

/// 단일 문자열 또는 문자열 리스트 → 리스트로 정규화
fn parse_label_list(key: &str, value: &Value, warnings: &mut Vec<String>) -> Option<Vec<String>> {
    match value {
        Value::String(s) => Some(vec![s.clone()]),
        Value::Array(items) => {
            let mut labels = Vec::with_capacity(items.len());
            for item in items {
                match item.as_str() {
                    Some(s) => labels.push(s.to_string()),
                    None => {
                        warnings
                            .push(format!("\"{key}\" must be a string or a list of strings"));
                        return None;
                    }
                }
            }
            Some(labels)
        }
        Value::Null => None,
        _ => {
            warnings.push(format!("\"{key}\" must be a string or a list of strings"));
            None
        }
    }
}

fn parse_bool(key: &str, value: &Value, warnings: &mut Vec<String>) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Null => None,
        _ => {
            warnings.push(format!("\"{key}\" must be a boolean"));
            None
        }
    }
}

fn parse_string(key: &str, value: &Value, warnings: &mut Vec<String>) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        _ => {
            warnings.push(format!("\"{key}\" must be a string"));
            None
        }
    }
}

/// 문자열이면 활성, false면 명시적 비활성
fn parse_comment(
    key: &str,
    value: &Value,
    warnings: &mut Vec<String>,
) -> Option<Option<String>> {
    match value {
        Value::String(s) => Some(Some(s.clone())),
        Value::Bool(false) => Some(None),
        Value::Null => None,
        _ => {
            warnings.push(format!("\"{key}\" must be a string or false"));
            None
        }
    }
}

fn parse_limit(key: &str, value: &Value, warnings: &mut Vec<String>) -> Option<u32> {
    match value.as_i64() {
        Some(n) if (1..=30).contains(&n) => Some(n as u32),
        _ => {
            warnings.push(format!("\"{key}\" must be an integer between 1 and 30"));
            None
        }
    }
}

fn parse_only(value: &Value, warnings: &mut Vec<String>) -> Option<ItemType> {
    match value {
        Value::Null => None,
        Value::String(s) => match ItemType::parse(s) {
            Ok(ty) => Some(ty),
            Err(_) => {
                warnings.push("\"only\" must be one of [issues, pulls, null]".to_string());
                None
            }
        },
        _ => {
            warnings.push("\"only\" must be one of [issues, pulls, null]".to_string());
            None
        }
    }
}
