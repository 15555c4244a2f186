//! 资源候选解析模块
//!
//! 为每个逻辑资源（立绘、图标等）生成有序、去重的候选定位符列表。
//! 解析端不检查资源是否存在：展示层按顺序尝试，加载失败时取下一个。

mod resolver;
mod state;

pub use resolver::{AssetResolver, DataRoot};
pub use state::{AssetLoad, AssetState};

use serde::{Deserialize, Serialize};

/// 资源种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetKind {
    Portrait,
    ElementIcon,
    PathIcon,
    SkillIcon,
    RankIcon,
    TraceIcon,
    RelicIcon,
    ConeIcon,
}

impl AssetKind {
    /// 裸文件名所归属的默认目录
    pub fn default_dir(&self) -> &'static str {
        match self {
            AssetKind::Portrait => "image/character_portrait/",
            AssetKind::ElementIcon => "icon/element/",
            AssetKind::PathIcon => "icon/path/",
            AssetKind::SkillIcon => "image/character_skill/",
            AssetKind::RankIcon => "image/character_rank/",
            AssetKind::TraceIcon => "image/character_skilltree/",
            AssetKind::RelicIcon => "icon/relic/",
            AssetKind::ConeIcon => "image/light_cone/",
        }
    }
}

/// 有序去重的候选定位符列表
///
/// 空列表合法，表示"没有可用资源"；这与所有候选都加载失败是两种不同状态。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetCandidateList {
    candidates: Vec<String>,
}

impl AssetCandidateList {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加候选；空串与重复项被忽略，保留首次出现的顺序
    pub fn push(&mut self, locator: impl Into<String>) {
        let locator = locator.into();
        if locator.is_empty() || self.candidates.contains(&locator) {
            return;
        }
        self.candidates.push(locator);
    }

    pub fn first(&self) -> Option<&str> {
        self.candidates.first().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.candidates
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.candidates.iter().map(String::as_str)
    }

    /// 开始一次加载（消耗列表）
    pub fn into_load(self) -> AssetLoad {
        AssetLoad::start(self)
    }

    pub(crate) fn into_inner(self) -> Vec<String> {
        self.candidates
    }
}

impl<S: Into<String>> FromIterator<S> for AssetCandidateList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut list = AssetCandidateList::new();
        for locator in iter {
            list.push(locator);
        }
        list
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_preserves_first_seen_order() {
        let list: AssetCandidateList = ["b.png", "a.png", "b.png", "", "c.png", "a.png"].into_iter().collect();
        assert_eq!(list.as_slice(), &["b.png", "a.png", "c.png"]);
        assert_eq!(list.first(), Some("b.png"));
    }

    #[test]
    fn test_empty_list_is_valid() {
        let list = AssetCandidateList::new();
        assert!(list.is_empty());
        assert_eq!(list.first(), None);
    }

    #[test]
    fn test_serializes_as_plain_array() {
        let list: AssetCandidateList = ["a.png"].into_iter().collect();
        assert_eq!(serde_json::to_string(&list).unwrap(), r#"["a.png"]"#);
    }
}
