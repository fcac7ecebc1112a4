use std::fmt;

use anyhow::Result;

/// markComment 기본값 — 설정 파일에서 문자열 또는 false로 덮어쓸 수 있다
pub const DEFAULT_MARK_COMMENT: &str = "Is this still relevant? If so, what is blocking it? \
     Is there anything you can do to help move it forward?\
     \n\nThis issue has been automatically marked as stale \
     because it has not had recent activity. \
     It will be closed if no further activity occurs.";

/// 처리 대상 아이템 종류. 검색 인덱스의 is:issue / is:pr 제한 조건에 대응한다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemType {
    Issues,
    Pulls,
}

impl ItemType {
    /// 설정/CLI 문자열 → ItemType. 인식할 수 없는 이름이면 에러.
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "issues" => Ok(Self::Issues),
            "pulls" => Ok(Self::Pulls),
            other => anyhow::bail!(
                "unknown item type: {other}. valid types are 'issues' and 'pulls'"
            ),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Issues => "issues",
            Self::Pulls => "pulls",
        }
    }

    /// 검색 쿼리의 타입 제한 조건
    pub fn query_restriction(&self) -> &'static str {
        match self {
            Self::Issues => "is:issue",
            Self::Pulls => "is:pr",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 톱레벨 설정값 — 모든 필드가 기본값으로 채워진 완결 상태
#[derive(Debug, Clone)]
pub struct StaleSettings {
    pub days_until_stale: f64,
    /// None이면 close sweep 비활성 (daysUntilClose: false)
    pub days_until_close: Option<f64>,
    pub only_labels: Vec<String>,
    pub exempt_labels: Vec<String>,
    pub exempt_projects: bool,
    pub exempt_milestones: bool,
    pub exempt_assignees: bool,
    pub stale_label: String,
    /// None이면 mark 시 댓글을 달지 않는다 (markComment: false)
    pub mark_comment: Option<String>,
    pub unmark_comment: Option<String>,
    pub close_comment: Option<String>,
    pub limit_per_run: u32,
    pub perform: bool,
}

impl Default for StaleSettings {
    fn default() -> Self {
        Self {
            days_until_stale: 60.0,
            days_until_close: Some(7.0),
            only_labels: Vec::new(),
            exempt_labels: vec!["pinned".to_string(), "security".to_string()],
            exempt_projects: false,
            exempt_milestones: false,
            exempt_assignees: false,
            stale_label: "stale".to_string(),
            mark_comment: Some(DEFAULT_MARK_COMMENT.to_string()),
            unmark_comment: None,
            close_comment: None,
            limit_per_run: 30,
            perform: true,
        }
    }
}

/// 타입별(issues/pulls) 오버라이드.
/// 사용자가 명시한 키만 Some으로 남는다 — 톱레벨 기본값을 여기에 써넣지 않는다.
#[derive(Debug, Clone, Default)]
pub struct TypeOverride {
    pub days_until_stale: Option<f64>,
    /// 바깥 Option = 키 존재 여부, 안쪽 Option = false로 비활성화했는지
    pub days_until_close: Option<Option<f64>>,
    pub only_labels: Option<Vec<String>>,
    pub exempt_labels: Option<Vec<String>>,
    pub exempt_projects: Option<bool>,
    pub exempt_milestones: Option<bool>,
    pub exempt_assignees: Option<bool>,
    pub stale_label: Option<String>,
    pub mark_comment: Option<Option<String>>,
    pub unmark_comment: Option<Option<String>>,
    pub close_comment: Option<Option<String>>,
    pub limit_per_run: Option<u32>,
    pub perform: Option<bool>,
}

/// 한 저장소의 런 설정. 톱레벨 + 타입별 오버라이드 2단 구조이며,
/// 필드 접근은 항상 `valueFor(type)` 꼴의 순수 접근자를 거친다.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    repo_name: String,
    only: Option<ItemType>,
    base: StaleSettings,
    issues: TypeOverride,
    pulls: TypeOverride,
}

impl ResolvedConfig {
    pub fn new(
        repo_name: String,
        base: StaleSettings,
        issues: TypeOverride,
        pulls: TypeOverride,
        only: Option<ItemType>,
    ) -> Self {
        Self {
            repo_name,
            only,
            base,
            issues,
            pulls,
        }
    }

    /// 설정 문서 없이 기본값만으로 구성 (테스트/설정 없는 레포)
    pub fn with_defaults(repo_name: &str) -> Self {
        Self::new(
            repo_name.to_string(),
            StaleSettings::default(),
            TypeOverride::default(),
            TypeOverride::default(),
            None,
        )
    }

    pub fn repo_name(&self) -> &str {
        &self.repo_name
    }

    /// "org/repo"의 org 부분
    pub fn owner(&self) -> &str {
        self.repo_name.split('/').next().unwrap_or(&self.repo_name)
    }

    pub fn only(&self) -> Option<ItemType> {
        self.only
    }

    fn overrides(&self, ty: ItemType) -> &TypeOverride {
        match ty {
            ItemType::Issues => &self.issues,
            ItemType::Pulls => &self.pulls,
        }
    }

    pub fn days_until_stale(&self, ty: ItemType) -> f64 {
        self.overrides(ty)
            .days_until_stale
            .unwrap_or(self.base.days_until_stale)
    }

    pub fn days_until_close(&self, ty: ItemType) -> Option<f64> {
        match self.overrides(ty).days_until_close {
            Some(v) => v,
            None => self.base.days_until_close,
        }
    }

    pub fn only_labels(&self, ty: ItemType) -> &[String] {
        self.overrides(ty)
            .only_labels
            .as_deref()
            .unwrap_or(&self.base.only_labels)
    }

    pub fn exempt_labels(&self, ty: ItemType) -> &[String] {
        self.overrides(ty)
            .exempt_labels
            .as_deref()
            .unwrap_or(&self.base.exempt_labels)
    }

    pub fn exempt_projects(&self, ty: ItemType) -> bool {
        self.overrides(ty)
            .exempt_projects
            .unwrap_or(self.base.exempt_projects)
    }

    pub fn exempt_milestones(&self, ty: ItemType) -> bool {
        self.overrides(ty)
            .exempt_milestones
            .unwrap_or(self.base.exempt_milestones)
    }

    pub fn exempt_assignees(&self, ty: ItemType) -> bool {
        self.overrides(ty)
            .exempt_assignees
            .unwrap_or(self.base.exempt_assignees)
    }

    pub fn stale_label(&self, ty: ItemType) -> &str {
        self.overrides(ty)
            .stale_label
            .as_deref()
            .unwrap_or(&self.base.stale_label)
    }

    pub fn mark_comment(&self, ty: ItemType) -> Option<&str> {
        match &self.overrides(ty).mark_comment {
            Some(v) => v.as_deref(),
            None => self.base.mark_comment.as_deref(),
        }
    }

    pub fn unmark_comment(&self, ty: ItemType) -> Option<&str> {
        match &self.overrides(ty).unmark_comment {
            Some(v) => v.as_deref(),
            None => self.base.unmark_comment.as_deref(),
        }
    }

    pub fn close_comment(&self, ty: ItemType) -> Option<&str> {
        match &self.overrides(ty).close_comment {
            Some(v) => v.as_deref(),
            None => self.base.close_comment.as_deref(),
        }
    }

    pub fn limit_per_run(&self, ty: ItemType) -> u32 {
        self.overrides(ty)
            .limit_per_run
            .unwrap_or(self.base.limit_per_run)
    }

    pub fn perform(&self, ty: ItemType) -> bool {
        self.overrides(ty).perform.unwrap_or(self.base.perform)
    }

    /// 런 시작 전 운영자 오버라이드: 모든 타입에 perform=false 강제 (--dry-run)
    pub fn force_dry_run(&mut self) {
        self.base.perform = false;
        self.issues.perform = Some(false);
        self.pulls.perform = Some(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_rejects_unknown_type() {
        assert!(ItemType::parse("donuts").is_err());
        assert_eq!(ItemType::parse("pulls").unwrap(), ItemType::Pulls);
        assert_eq!(ItemType::parse("issues").unwrap(), ItemType::Issues);
    }

    #[test]
    fn override_takes_precedence_per_type_only() {
        let mut config = ResolvedConfig::with_defaults("org/repo");
        config.pulls.days_until_stale = Some(90.0);

        assert_eq!(config.days_until_stale(ItemType::Pulls), 90.0);
        assert_eq!(config.days_until_stale(ItemType::Issues), 60.0);
    }

    #[test]
    fn explicit_false_override_disables_comment() {
        let mut config = ResolvedConfig::with_defaults("org/repo");
        config.pulls.mark_comment = Some(None);

        assert!(config.mark_comment(ItemType::Pulls).is_none());
        assert!(config.mark_comment(ItemType::Issues).is_some());
    }

    #[test]
    fn owner_is_org_part() {
        let config = ResolvedConfig::with_defaults("acme/widgets");
        assert_eq!(config.owner(), "acme");
    }
}
