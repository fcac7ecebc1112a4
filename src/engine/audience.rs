//! 저장소 → 담당 팀 해석.
//!
//! 조직의 팀 목록을 런당 한 번만 조회해 캐시하고, 대상 저장소를
//! 담당 목록에 포함하는 첫 번째 팀을 반환한다. 런을 넘어서는 캐시는
//! 없다 — 매 런이 실시간 membership을 반영해야 한다.

use std::sync::Arc;

use serde::Deserialize;
use tokio::sync::OnceCell;

use crate::infrastructure::gh::Gh;

/// 알림 대상 팀
#[derive(Debug, Clone)]
pub struct Audience {
    pub slug: String,
}

impl Audience {
    /// 댓글 본문에 들어갈 멘션 문자열
    pub fn mention(&self) -> String {
        format!("@{}", self.slug)
    }
}

#[derive(Debug, Deserialize)]
struct OrgTeam {
    slug: String,
}

#[derive(Debug, Deserialize)]
struct TeamRepo {
    full_name: String,
}

pub struct AudienceResolver {
    gh: Arc<dyn Gh>,
    org: String,
    repo_name: String,
    gh_host: Option<String>,
    resolved: OnceCell<Option<Audience>>,
}

impl AudienceResolver {
    pub fn new(gh: Arc<dyn Gh>, repo_name: &str, gh_host: Option<String>) -> Self {
        let org = repo_name.split('/').next().unwrap_or(repo_name).to_string();
        Self {
            gh,
            org,
            repo_name: repo_name.to_string(),
            gh_host,
            resolved: OnceCell::new(),
        }
    }

    /// 담당 팀 조회. 조회 실패나 빈 목록은 "담당 없음"으로 처리하고
    /// 런을 실패시키지 않는다.
    pub async fn resolve(&self) -> Option<Audience> {
        self.resolved.get_or_init(|| self.lookup()).await.clone()
    }

    async fn lookup(&self) -> Option<Audience> {
        let host = self.gh_host.as_deref();

        let bytes = match self.gh.org_teams(&self.org, host).await {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!("team listing failed for {}: {e}", self.org);
                return None;
            }
        };
        let teams: Vec<OrgTeam> = serde_json::from_slice(&bytes).unwrap_or_default();

        for team in &teams {
            let repos = match self.gh.team_repos(&self.org, &team.slug, host).await {
                Ok(b) => serde_json::from_slice::<Vec<TeamRepo>>(&b).unwrap_or_default(),
                Err(e) => {
                    tracing::debug!("repo listing failed for team {}: {e}", team.slug);
                    continue;
                }
            };
            if repos.iter().any(|r| r.full_name == self.repo_name) {
                return Some(Audience {
                    slug: team.slug.clone(),
                });
            }
        }
        None
    }
}
