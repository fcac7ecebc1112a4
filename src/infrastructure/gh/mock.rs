use std::collections::HashSet;
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};

use super::Gh;

/// 테스트용 Gh 구현체 — 미리 설정된 응답을 반환하고 뮤테이션을 기록한다
pub struct MockGh {
    /// 쿼리 부분 문자열 → 검색 결과 items. 가장 긴 매칭 키가 선택된다.
    search_items: Mutex<Vec<(String, Vec<Value>)>>,
    /// 존재하는 라벨 이름
    labels: Mutex<HashSet<String>>,
    /// label_get이 404가 아닌 오류를 내도록 설정
    fail_label_lookup: Mutex<bool>,
    /// (slug, 담당 저장소 목록). None이면 membership 조회가 실패한다.
    teams: Mutex<Vec<(String, Option<Vec<String>>)>>,
    /// per_page를 무시하고 전체 결과를 돌려주는 검색 인덱스 시뮬레이션
    ignore_per_page: Mutex<bool>,
    /// 생성된 라벨 기록: (repo_name, name, color)
    pub created_labels: Mutex<Vec<(String, String, String)>>,
    /// 게시된 댓글 기록: (repo_name, number, body)
    pub posted_comments: Mutex<Vec<(String, i64, String)>>,
    /// 추가된 라벨 기록: (repo_name, number, label)
    pub added_labels: Mutex<Vec<(String, i64, String)>>,
    /// 제거된 라벨 기록: (repo_name, number, label)
    pub removed_labels: Mutex<Vec<(String, i64, String)>>,
    /// 닫힌 아이템 기록: (repo_name, number)
    pub closed_items: Mutex<Vec<(String, i64)>>,
}

impl Default for MockGh {
    fn default() -> Self {
        Self {
            search_items: Mutex::new(Vec::new()),
            labels: Mutex::new(HashSet::new()),
            fail_label_lookup: Mutex::new(false),
            teams: Mutex::new(Vec::new()),
            ignore_per_page: Mutex::new(false),
            created_labels: Mutex::new(Vec::new()),
            posted_comments: Mutex::new(Vec::new()),
            added_labels: Mutex::new(Vec::new()),
            removed_labels: Mutex::new(Vec::new()),
            closed_items: Mutex::new(Vec::new()),
        }
    }
}

impl MockGh {
    pub fn new() -> Self {
        Self::default()
    }

    /// 검색 응답 설정. key가 쿼리 문자열에 포함되면 매칭된다.
    pub fn set_search(&self, key: &str, items: Vec<Value>) {
        self.search_items
            .lock()
            .unwrap()
            .push((key.to_string(), items));
    }

    /// 라벨이 이미 존재하는 것으로 설정
    pub fn set_label_exists(&self, name: &str) {
        self.labels.lock().unwrap().insert(name.to_string());
    }

    /// label_get이 404가 아닌 오류를 내도록 설정
    pub fn set_fail_label_lookup(&self) {
        *self.fail_label_lookup.lock().unwrap() = true;
    }

    /// 팀과 담당 저장소 목록 등록
    pub fn add_team(&self, slug: &str, repos: Vec<&str>) {
        self.teams.lock().unwrap().push((
            slug.to_string(),
            Some(repos.into_iter().map(str::to_string).collect()),
        ));
    }

    /// membership 조회가 실패하는 팀 등록
    pub fn add_team_unlistable(&self, slug: &str) {
        self.teams.lock().unwrap().push((slug.to_string(), None));
    }

    /// 검색이 per_page 경계를 무시하고 과잉 반환하도록 설정
    pub fn set_unbounded_results(&self) {
        *self.ignore_per_page.lock().unwrap() = true;
    }
}

#[async_trait]
impl Gh for MockGh {
    async fn search_issues(
        &self,
        params: &[(&str, &str)],
        _host: Option<&str>,
    ) -> Result<Vec<u8>> {
        let q = params
            .iter()
            .find(|(k, _)| *k == "q")
            .map(|(_, v)| *v)
            .unwrap_or("");
        let per_page: usize = params
            .iter()
            .find(|(k, _)| *k == "per_page")
            .and_then(|(_, v)| v.parse().ok())
            .unwrap_or(30);

        let store = self.search_items.lock().unwrap();
        let mut best: Option<&(String, Vec<Value>)> = None;
        for entry in store.iter() {
            if q.contains(&entry.0) && best.map_or(true, |b| entry.0.len() > b.0.len()) {
                best = Some(entry);
            }
        }
        let entry = best.ok_or_else(|| anyhow::anyhow!("no mock search response for: {q}"))?;

        let mut items = entry.1.clone();
        if !*self.ignore_per_page.lock().unwrap() {
            items.truncate(per_page);
        }
        Ok(serde_json::to_vec(&items)?)
    }

    async fn label_get(
        &self,
        repo_name: &str,
        name: &str,
        _host: Option<&str>,
    ) -> Result<Option<String>> {
        if *self.fail_label_lookup.lock().unwrap() {
            anyhow::bail!("label lookup failed for {repo_name}");
        }
        if self.labels.lock().unwrap().contains(name) {
            Ok(Some(name.to_string()))
        } else {
            Ok(None)
        }
    }

    async fn label_create(
        &self,
        repo_name: &str,
        name: &str,
        color: &str,
        _host: Option<&str>,
    ) -> bool {
        self.labels.lock().unwrap().insert(name.to_string());
        self.created_labels.lock().unwrap().push((
            repo_name.to_string(),
            name.to_string(),
            color.to_string(),
        ));
        true
    }

    async fn issue_comment(
        &self,
        repo_name: &str,
        number: i64,
        body: &str,
        _host: Option<&str>,
    ) -> bool {
        self.posted_comments.lock().unwrap().push((
            repo_name.to_string(),
            number,
            body.to_string(),
        ));
        true
    }

    async fn label_add(
        &self,
        repo_name: &str,
        number: i64,
        label: &str,
        _host: Option<&str>,
    ) -> bool {
        self.added_labels.lock().unwrap().push((
            repo_name.to_string(),
            number,
            label.to_string(),
        ));
        true
    }

    async fn label_remove(
        &self,
        repo_name: &str,
        number: i64,
        label: &str,
        _host: Option<&str>,
    ) -> bool {
        self.removed_labels.lock().unwrap().push((
            repo_name.to_string(),
            number,
            label.to_string(),
        ));
        true
    }

    async fn issue_close(&self, repo_name: &str, number: i64, _host: Option<&str>) -> bool {
        self.closed_items
            .lock()
            .unwrap()
            .push((repo_name.to_string(), number));
        true
    }

    async fn org_teams(&self, _org: &str, _host: Option<&str>) -> Result<Vec<u8>> {
        let teams = self.teams.lock().unwrap();
        let list: Vec<Value> = teams
            .iter()
            .map(|(slug, _)| json!({ "slug": slug, "name": slug }))
            .collect();
        Ok(serde_json::to_vec(&list)?)
    }

    async fn team_repos(&self, _org: &str, slug: &str, _host: Option<&str>) -> Result<Vec<u8>> {
        let teams = self.teams.lock().unwrap();
        let entry = teams.iter().find(|(s, _)| s == slug);
        match entry {
            Some((_, Some(repos))) => {
                let list: Vec<Value> =
                    repos.iter().map(|r| json!({ "full_name": r })).collect();
                Ok(serde_json::to_vec(&list)?)
            }
            _ => anyhow::bail!("repo listing unavailable for team {slug}"),
        }
    }
}
