pub mod mock;
pub mod real;

use anyhow::Result;
use async_trait::async_trait;

pub use real::RealGh;

/// GitHub CLI (`gh`) 추상화
#[async_trait]
pub trait Gh: Send + Sync {
    /// `gh api search/issues` — 검색 인덱스 조회. `.items` 배열의 raw JSON을 반환한다.
    /// params: [("q", ...), ("sort", "updated"), ("order", "desc"), ("per_page", "30")]
    async fn search_issues(&self, params: &[(&str, &str)], host: Option<&str>)
        -> Result<Vec<u8>>;

    /// `gh api repos/{repo}/labels/{name}` — 라벨 조회.
    /// 404는 Ok(None). 그 외 실패는 Err — 런 전체를 중단해야 하는 오류다.
    async fn label_get(
        &self,
        repo_name: &str,
        name: &str,
        host: Option<&str>,
    ) -> Result<Option<String>>;

    /// `gh api repos/{repo}/labels --method POST` — 라벨 생성 (best effort)
    async fn label_create(
        &self,
        repo_name: &str,
        name: &str,
        color: &str,
        host: Option<&str>,
    ) -> bool;

    /// `gh issue comment {number} --repo {repo} --body {body}`
    /// 실패해도 계속 진행 (best effort)
    async fn issue_comment(
        &self,
        repo_name: &str,
        number: i64,
        body: &str,
        host: Option<&str>,
    ) -> bool;

    /// 라벨 추가 (best effort)
    async fn label_add(
        &self,
        repo_name: &str,
        number: i64,
        label: &str,
        host: Option<&str>,
    ) -> bool;

    /// 라벨 제거 — 이미 제거된 라벨(404)도 실패로 치지 않는다 (best effort)
    async fn label_remove(
        &self,
        repo_name: &str,
        number: i64,
        label: &str,
        host: Option<&str>,
    ) -> bool;

    /// `gh api repos/{repo}/issues/{number} --method PATCH -f state=closed`
    /// 아이템 닫기 (best effort)
    async fn issue_close(&self, repo_name: &str, number: i64, host: Option<&str>) -> bool;

    /// `gh api orgs/{org}/teams --paginate` — 조직의 팀 목록
    async fn org_teams(&self, org: &str, host: Option<&str>) -> Result<Vec<u8>>;

    /// `gh api orgs/{org}/teams/{slug}/repos --paginate` — 팀이 담당하는 저장소 목록
    async fn team_repos(&self, org: &str, slug: &str, host: Option<&str>) -> Result<Vec<u8>>;
}
