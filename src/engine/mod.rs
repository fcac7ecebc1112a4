//! Mark-and-sweep 엔진.
//!
//! 한 번의 런은 원격 상태만으로 모든 것을 다시 계산한다 — 런 사이에
//! 남기는 로컬 상태가 없으므로 같은 스냅샷에 다시 돌려도 안전하다.
//! 아이템 처리 핸들러는 동시에 fan-out되며, 핸들러 간 공유 가변
//! 상태는 ActionBudget 하나뿐이다.

pub mod audience;
pub mod budget;
pub mod query;

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::config::models::{ItemType, ResolvedConfig};
use crate::domain::models::StaleItem;
use crate::infrastructure::gh::Gh;

use self::audience::{Audience, AudienceResolver};
use self::budget::ActionBudget;

/// 댓글 템플릿에서 담당 팀 멘션으로 치환되는 자리표시자
pub const TEAM_PLACEHOLDER: &str = "$TEAM";

/// 새로 만드는 stale 라벨 색
const STALE_LABEL_COLOR: &str = "ffffff";

// ─── Run Summary ───

/// 한 번의 런 결과 집계
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// stale로 분류되어 mark된 (dry run에서는 mark됐을) 아이템 수
    pub marked: usize,
    /// close sweep으로 닫힌 (dry run에서는 닫혔을) 아이템 수
    pub closed: usize,
    /// 예산 소진으로 건너뛴 아이템 수 — 다음 런으로 넘어간다
    pub skipped_budget: usize,
    /// 담당 팀이 없어 멘션 댓글을 생략한 아이템 수
    pub mentions_skipped: usize,
    /// perform=false로 실행됐는지
    pub dry_run: bool,
}

impl RunSummary {
    pub fn line(&self) -> String {
        let mut s = format!(
            "marked {} / closed {} / budget-skipped {}",
            self.marked, self.closed, self.skipped_budget
        );
        if self.mentions_skipped > 0 {
            s.push_str(&format!(" / mentions-skipped {}", self.mentions_skipped));
        }
        if self.dry_run {
            s.push_str(" (dry-run)");
        }
        s
    }
}

// ─── Comment Plan ───

/// 한 phase에서 각 아이템에 달 댓글 계획.
/// 치환은 phase마다 한 번만 일어나고 핸들러에는 결과만 전달된다.
#[derive(Debug, Clone)]
enum CommentPlan {
    /// 템플릿 없음 — 댓글 생략
    None,
    /// 치환 완료된 본문
    Ready(String),
    /// 멘션 자리표시자가 있으나 담당 팀이 없음 — 댓글 생략 + 기록
    MissingAudience,
}

fn plan_comment(template: Option<&str>, audience: Option<&Audience>) -> CommentPlan {
    match template {
        None => CommentPlan::None,
        Some(t) if !t.contains(TEAM_PLACEHOLDER) => CommentPlan::Ready(t.to_string()),
        Some(t) => match audience {
            Some(a) => CommentPlan::Ready(t.replace(TEAM_PLACEHOLDER, &a.mention())),
            None => CommentPlan::MissingAudience,
        },
    }
}

enum ItemOutcome {
    Marked { mention_skipped: bool },
    Closed { mention_skipped: bool },
    SkippedBudget,
}

// ─── Engine ───

pub struct MarkSweep {
    gh: Arc<dyn Gh>,
    config: ResolvedConfig,
    gh_host: Option<String>,
}

impl MarkSweep {
    pub fn new(gh: Arc<dyn Gh>, config: ResolvedConfig, gh_host: Option<String>) -> Self {
        Self { gh, config, gh_host }
    }

    /// 한 아이템 타입에 대한 mark + sweep 런.
    ///
    /// perform=false여도 탐색/필터/분류는 동일하게 수행하고 로깅한다 —
    /// 차이는 원격 뮤테이션이 없다는 것뿐이며, 예산도 쓰지 않는다.
    pub async fn run(&self, ty: ItemType) -> Result<RunSummary> {
        let repo = self.config.repo_name();

        if let Some(only) = self.config.only() {
            if only != ty {
                debug!("{repo}: configured to handle {only} only, skipping {ty}");
                return Ok(RunSummary::default());
            }
        }

        let perform = self.config.perform(ty);
        info!("starting mark and sweep of {ty} for {repo} (perform={perform})");

        let action_budget = Arc::new(ActionBudget::new(self.config.limit_per_run(ty)));
        let mut summary = RunSummary {
            dry_run: !perform,
            ..Default::default()
        };

        self.ensure_stale_label(ty, perform).await?;

        // 멘션이 필요한 템플릿이 하나라도 있을 때만, 런당 한 번 담당 팀을 해석한다
        let needs_audience = [self.config.mark_comment(ty), self.config.close_comment(ty)]
            .iter()
            .flatten()
            .any(|t| t.contains(TEAM_PLACEHOLDER));
        let audience = if needs_audience {
            let resolver =
                AudienceResolver::new(Arc::clone(&self.gh), repo, self.gh_host.clone());
            resolver.resolve().await
        } else {
            None
        };

        let now = Utc::now();

        self.mark(ty, now, perform, &action_budget, audience.as_ref(), &mut summary)
            .await?;
        self.sweep(ty, now, perform, &action_budget, audience.as_ref(), &mut summary)
            .await?;

        info!("{repo} {ty}: {}", summary.line());
        Ok(summary)
    }

    /// 활동이 감지된 아이템에서 stale 라벨을 제거한다.
    /// 라벨이 이미 없어도 실패로 치지 않으며, 예산과 무관한 단건 동작이다.
    pub async fn unmark(&self, ty: ItemType, number: i64) -> Result<()> {
        let repo = self.config.repo_name();
        let host = self.gh_host.as_deref();

        if !self.config.perform(ty) {
            info!("{repo}#{number} would have been unmarked (dry-run)");
            return Ok(());
        }

        info!("{repo}#{number} is being unmarked");
        self.gh
            .label_remove(repo, number, self.config.stale_label(ty), host)
            .await;
        if let Some(body) = self.config.unmark_comment(ty) {
            self.gh.issue_comment(repo, number, body, host).await;
        }
        Ok(())
    }

    // ─── Phases ───

    async fn mark(
        &self,
        ty: ItemType,
        now: chrono::DateTime<Utc>,
        perform: bool,
        action_budget: &Arc<ActionBudget>,
        audience: Option<&Audience>,
        summary: &mut RunSummary,
    ) -> Result<()> {
        let search_query = query::build_stale_query(ty, &self.config, now);
        let items = self.search(&search_query, action_budget.remaining()).await?;
        let plan = plan_comment(self.config.mark_comment(ty), audience);

        let mut join_set = JoinSet::new();
        for item in items.into_iter().filter(StaleItem::is_actionable) {
            let gh = Arc::clone(&self.gh);
            let action_budget = Arc::clone(action_budget);
            let repo = self.config.repo_name().to_string();
            let stale_label = self.config.stale_label(ty).to_string();
            let host = self.gh_host.clone();
            let plan = plan.clone();

            join_set.spawn(async move {
                mark_one(
                    gh,
                    &repo,
                    item.number,
                    &stale_label,
                    plan,
                    perform,
                    &action_budget,
                    host.as_deref(),
                )
                .await
            });
        }

        collect_outcomes(&mut join_set, summary).await;
        Ok(())
    }

    async fn sweep(
        &self,
        ty: ItemType,
        now: chrono::DateTime<Utc>,
        perform: bool,
        action_budget: &Arc<ActionBudget>,
        audience: Option<&Audience>,
        summary: &mut RunSummary,
    ) -> Result<()> {
        let Some(search_query) = query::build_closable_query(ty, &self.config, now) else {
            return Ok(());
        };
        if perform && action_budget.remaining() == 0 {
            debug!(
                "{}: budget exhausted before sweep, leaving closable items for next run",
                self.config.repo_name()
            );
            return Ok(());
        }

        let items = self.search(&search_query, action_budget.remaining()).await?;
        let plan = plan_comment(self.config.close_comment(ty), audience);

        let mut join_set = JoinSet::new();
        for item in items.into_iter().filter(StaleItem::is_actionable) {
            let gh = Arc::clone(&self.gh);
            let action_budget = Arc::clone(action_budget);
            let repo = self.config.repo_name().to_string();
            let host = self.gh_host.clone();
            let plan = plan.clone();

            join_set.spawn(async move {
                close_one(gh, &repo, item.number, plan, perform, &action_budget, host.as_deref())
                    .await
            });
        }

        collect_outcomes(&mut join_set, summary).await;
        Ok(())
    }

    // ─── Run-level steps ───

    /// 설정된 stale 라벨이 저장소에 없으면 만든다.
    /// 404가 아닌 조회 오류는 런 전체를 중단한다.
    async fn ensure_stale_label(&self, ty: ItemType, perform: bool) -> Result<()> {
        let repo = self.config.repo_name();
        let name = self.config.stale_label(ty);
        let host = self.gh_host.as_deref();

        match self.gh.label_get(repo, name, host).await? {
            Some(_) => Ok(()),
            None if !perform => {
                info!("{repo}: would have created label '{name}' (dry-run)");
                Ok(())
            }
            None => {
                info!("{repo}: creating label '{name}'");
                if !self.gh.label_create(repo, name, STALE_LABEL_COLOR, host).await {
                    warn!("{repo}: failed to create label '{name}'");
                }
                Ok(())
            }
        }
    }

    async fn search(&self, search_query: &str, per_page: u32) -> Result<Vec<StaleItem>> {
        let repo = self.config.repo_name();
        let per_page = per_page.to_string();
        let params = [
            ("q", search_query),
            ("sort", "updated"),
            ("order", "desc"),
            ("per_page", per_page.as_str()),
        ];

        debug!("searching {repo}: {search_query}");
        let bytes = self
            .gh
            .search_issues(&params, self.gh_host.as_deref())
            .await?;
        let items: Vec<StaleItem> =
            serde_json::from_slice(&bytes).context("failed to parse search results")?;
        Ok(items)
    }
}

// ─── Item Handlers ───

/// 핸들러 결과를 집계한다. 패닉한 핸들러는 로깅만 하고 런은 계속된다.
async fn collect_outcomes(join_set: &mut JoinSet<ItemOutcome>, summary: &mut RunSummary) {
    while let Some(result) = join_set.join_next().await {
        match result {
            Ok(ItemOutcome::Marked { mention_skipped }) => {
                summary.marked += 1;
                if mention_skipped {
                    summary.mentions_skipped += 1;
                }
            }
            Ok(ItemOutcome::Closed { mention_skipped }) => {
                summary.closed += 1;
                if mention_skipped {
                    summary.mentions_skipped += 1;
                }
            }
            Ok(ItemOutcome::SkippedBudget) => summary.skipped_budget += 1,
            Err(e) => warn!("item handler panicked: {e}"),
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn mark_one(
    gh: Arc<dyn Gh>,
    repo: &str,
    number: i64,
    stale_label: &str,
    plan: CommentPlan,
    perform: bool,
    action_budget: &ActionBudget,
    host: Option<&str>,
) -> ItemOutcome {
    // dry run은 예산을 쓰지 않는다 — 분류만 하고 기록
    if !perform {
        info!("{repo}#{number} would have been marked (dry-run)");
        return ItemOutcome::Marked {
            mention_skipped: matches!(plan, CommentPlan::MissingAudience),
        };
    }

    if !action_budget.try_consume() {
        debug!("{repo}#{number}: action budget exhausted, leaving for next run");
        return ItemOutcome::SkippedBudget;
    }

    info!("{repo}#{number} is being marked");
    let mut mention_skipped = false;
    match plan {
        CommentPlan::Ready(body) => {
            gh.issue_comment(repo, number, &body, host).await;
        }
        CommentPlan::MissingAudience => {
            warn!("{repo}#{number}: no responsible team found, skipping mention comment");
            mention_skipped = true;
        }
        CommentPlan::None => {}
    }
    gh.label_add(repo, number, stale_label, host).await;

    ItemOutcome::Marked { mention_skipped }
}

async fn close_one(
    gh: Arc<dyn Gh>,
    repo: &str,
    number: i64,
    plan: CommentPlan,
    perform: bool,
    action_budget: &ActionBudget,
    host: Option<&str>,
) -> ItemOutcome {
    if !perform {
        info!("{repo}#{number} would have been closed (dry-run)");
        return ItemOutcome::Closed {
            mention_skipped: matches!(plan, CommentPlan::MissingAudience),
        };
    }

    if !action_budget.try_consume() {
        debug!("{repo}#{number}: action budget exhausted, leaving for next run");
        return ItemOutcome::SkippedBudget;
    }

    info!("{repo}#{number} is being closed after its grace period");
    let mut mention_skipped = false;
    match plan {
        CommentPlan::Ready(body) => {
            gh.issue_comment(repo, number, &body, host).await;
        }
        CommentPlan::MissingAudience => {
            warn!("{repo}#{number}: no responsible team found, skipping mention comment");
            mention_skipped = true;
        }
        CommentPlan::None => {}
    }
    gh.issue_close(repo, number, host).await;

    ItemOutcome::Closed { mention_skipped }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_without_placeholder_keeps_template() {
        let plan = plan_comment(Some("still relevant?"), None);
        assert!(matches!(plan, CommentPlan::Ready(b) if b == "still relevant?"));
    }

    #[test]
    fn plan_substitutes_audience_mention() {
        let audience = Audience {
            slug: "team-x".to_string(),
        };
        let plan = plan_comment(Some("$TEAM ping"), Some(&audience));
        assert!(matches!(plan, CommentPlan::Ready(b) if b == "@team-x ping"));
    }

    #[test]
    fn plan_withholds_comment_without_audience() {
        let plan = plan_comment(Some("$TEAM ping"), None);
        assert!(matches!(plan, CommentPlan::MissingAudience));
    }

    #[test]
    fn plan_none_without_template() {
        assert!(matches!(plan_comment(None, None), CommentPlan::None));
    }

    #[test]
    fn summary_line_mentions_dry_run() {
        let summary = RunSummary {
            marked: 2,
            dry_run: true,
            ..Default::default()
        };
        let line = summary.line();
        assert!(line.contains("marked 2"));
        assert!(line.contains("(dry-run)"));
    }
}
