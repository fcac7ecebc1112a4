use std::path::Path;

use serde_json::Value;

use super::models::ResolvedConfig;
use super::schema;

pub const CONFIG_FILENAME: &str = "stalebot.yml";

/// YAML 파일 → raw JSON Value.
/// struct가 아닌 Value 단계로 읽어야 미지정 필드와 명시된 필드를 구분할 수 있다.
pub fn load_raw(path: &Path) -> Option<Value> {
    let content = std::fs::read_to_string(path).ok()?;
    serde_yaml::from_str(&content).ok()
}

/// 설정 파일을 읽어 검증/정규화까지 수행한다.
/// 파일이 없으면 perform=false 기본값 — 설정 없는 레포에는 행동하지 않는다.
pub fn load_for_repo(repo_name: &str, path: &Path) -> (ResolvedConfig, Vec<String>) {
    match load_raw(path) {
        Some(raw) => schema::validate(repo_name, &raw),
        None => {
            let mut config = ResolvedConfig::with_defaults(repo_name);
            config.force_dry_run();
            (
                config,
                vec![format!(
                    "no config at {}, running with perform=false",
                    path.display()
                )],
            )
        }
    }
}
