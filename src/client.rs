use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::{info, warn};

use crate::config::loader;
use crate::config::models::{ItemType, ResolvedConfig};
use crate::engine::MarkSweep;
use crate::infrastructure::gh::Gh;

/// 레포 설정을 읽고 검증 경고를 로깅한다
pub fn resolve_config(repo_name: &str, config_path: &Path, dry_run: bool) -> ResolvedConfig {
    let (mut config, warnings) = loader::load_for_repo(repo_name, config_path);
    for w in &warnings {
        warn!("invalid config for {repo_name}: {w}");
    }
    if dry_run {
        config.force_dry_run();
    }
    config
}

/// 단발 실행: issues와 pulls 각각 mark+sweep 런을 돌린다.
/// 설정의 only 제한과 CLI --only를 둘 다 존중한다.
pub async fn run_once(
    gh: Arc<dyn Gh>,
    repo_name: &str,
    config_path: &Path,
    only: Option<ItemType>,
    dry_run: bool,
    gh_host: Option<String>,
) -> Result<()> {
    let config = resolve_config(repo_name, config_path, dry_run);
    let engine = MarkSweep::new(gh, config, gh_host);

    for ty in [ItemType::Issues, ItemType::Pulls] {
        if only.is_some_and(|o| o != ty) {
            continue;
        }
        let summary = engine.run(ty).await?;
        println!("{repo_name} {ty}: {}", summary.line());
    }
    Ok(())
}

/// 주기 실행 루프. 설정은 틱마다 다시 읽는다.
/// 종료 신호는 틱 사이에만 확인하므로 진행 중인 런은 끊기지 않는다 —
/// 뮤테이션 도중 중단으로 인한 불완전 상태를 만들지 않는다.
pub async fn watch(
    gh: Arc<dyn Gh>,
    repo_name: &str,
    config_path: &Path,
    only: Option<ItemType>,
    dry_run: bool,
    gh_host: Option<String>,
    interval_secs: u64,
) -> Result<()> {
    let mut tick = tokio::time::interval(Duration::from_secs(interval_secs));
    info!("watch loop starting for {repo_name} (interval={interval_secs}s)");

    loop {
        tokio::select! {
            _ = tick.tick() => {
                let config = resolve_config(repo_name, config_path, dry_run);
                let engine = MarkSweep::new(Arc::clone(&gh), config, gh_host.clone());

                for ty in [ItemType::Issues, ItemType::Pulls] {
                    if only.is_some_and(|o| o != ty) {
                        continue;
                    }
                    match engine.run(ty).await {
                        Ok(summary) => info!("{repo_name} {ty}: {}", summary.line()),
                        Err(e) => tracing::error!("run failed for {repo_name} {ty}: {e:#}"),
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("received SIGINT, shutting down...");
                break;
            }
        }
    }
    Ok(())
}

/// 활동이 감지된 아이템의 stale 라벨 제거
pub async fn unmark(
    gh: Arc<dyn Gh>,
    repo_name: &str,
    config_path: &Path,
    ty: ItemType,
    number: i64,
    dry_run: bool,
    gh_host: Option<String>,
) -> Result<()> {
    let config = resolve_config(repo_name, config_path, dry_run);
    let engine = MarkSweep::new(gh, config, gh_host);
    engine.unmark(ty, number).await
}

/// 현재 설정 표시 (파일 + 기본값 머지 결과)
pub fn config_show(repo_name: &str, config_path: &Path) -> Result<String> {
    let (config, warnings) = loader::load_for_repo(repo_name, config_path);

    let mut output = String::new();
    for w in &warnings {
        output.push_str(&format!("# warning: {w}\n"));
    }

    for ty in [ItemType::Issues, ItemType::Pulls] {
        output.push_str(&format!("[{ty}]\n"));
        output.push_str(&format!("  perform: {}\n", config.perform(ty)));
        output.push_str(&format!(
            "  daysUntilStale: {}\n",
            config.days_until_stale(ty)
        ));
        let close = config
            .days_until_close(ty)
            .map(|d| d.to_string())
            .unwrap_or_else(|| "false".to_string());
        output.push_str(&format!("  daysUntilClose: {close}\n"));
        output.push_str(&format!("  staleLabel: {}\n", config.stale_label(ty)));
        output.push_str(&format!("  limitPerRun: {}\n", config.limit_per_run(ty)));
        output.push_str(&format!("  onlyLabels: {:?}\n", config.only_labels(ty)));
        output.push_str(&format!("  exemptLabels: {:?}\n", config.exempt_labels(ty)));
        output.push_str(&format!(
            "  exemptProjects: {} / exemptMilestones: {} / exemptAssignees: {}\n",
            config.exempt_projects(ty),
            config.exempt_milestones(ty),
            config.exempt_assignees(ty)
        ));
        output.push_str(&format!(
            "  markComment: {}\n",
            comment_state(config.mark_comment(ty))
        ));
        output.push_str(&format!(
            "  closeComment: {}\n",
            comment_state(config.close_comment(ty))
        ));
        output.push_str(&format!(
            "  unmarkComment: {}\n",
            comment_state(config.unmark_comment(ty))
        ));
    }

    if let Some(only) = config.only() {
        output.push_str(&format!("only: {only}\n"));
    }

    Ok(output)
}

fn comment_state(comment: Option<&str>) -> String {
    match comment {
        Some(body) => format!("{} chars", body.len()),
        None => "false".to_string(),
    }
}
