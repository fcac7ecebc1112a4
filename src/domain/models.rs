use serde::Deserialize;

/// 검색 API가 반환하는 이슈/PR 스냅샷.
/// 런마다 새로 조회하며 런 사이에 저장하지 않는다.
#[derive(Debug, Clone, Deserialize)]
pub struct StaleItem {
    pub number: i64,
    pub state: String,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub labels: Vec<ItemLabel>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ItemLabel {
    pub name: String,
}

impl StaleItem {
    /// 액션 대상 여부 — locked이거나 이미 닫힌 아이템은 예산도 쓰지 않고 제외
    pub fn is_actionable(&self) -> bool {
        !self.locked && self.state != "closed"
    }

    pub fn has_label(&self, name: &str) -> bool {
        self.labels.iter().any(|l| l.name == name)
    }
}
