use serde_json::Value;

use crate::datatypes::as_text;
use crate::schema::{AbilityRecord, LightCone, RankRecord, RelicSet, TraceNode};

use super::{AssetCandidateList, AssetKind};

/// 头像表中可能携带立绘的字段（按优先级）
const AVATAR_PORTRAIT_FIELDS: &[&str] = &["portrait", "icon", "url", "image", "iconPath"];

/// 数据根前缀
///
/// 相对定位符都以它为基准改写；绝对地址（`http(s):`、`data:`、以 `/` 开头）原样通过。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataRoot {
    prefix: String,
}

impl DataRoot {
    pub fn new(prefix: impl Into<String>) -> Self {
        let mut prefix = prefix.into().replace('\\', "/");
        if !prefix.is_empty() && !prefix.ends_with('/') {
            prefix.push('/');
        }
        Self { prefix }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// 改写单个定位符；空值返回 None
    ///
    /// 裸文件名（不含 `/`）放入该资源种类的默认目录。
    pub fn rewrite(&self, kind: AssetKind, locator: &str) -> Option<String> {
        let normalized = locator.trim().replace('\\', "/");
        if normalized.is_empty() {
            return None;
        }
        if is_absolute(&normalized) {
            return Some(normalized);
        }

        let mut relative = normalized.as_str();
        while let Some(rest) = relative.strip_prefix("./") {
            relative = rest;
        }
        if relative.is_empty() {
            return None;
        }

        if relative.contains('/') {
            Some(format!("{}{}", self.prefix, relative))
        } else {
            Some(format!("{}{}{}", self.prefix, kind.default_dir(), relative))
        }
    }
}

impl Default for DataRoot {
    fn default() -> Self {
        Self::new("/data/")
    }
}

fn is_absolute(locator: &str) -> bool {
    let lower = locator.to_ascii_lowercase();
    lower.starts_with("http:") || lower.starts_with("https:") || lower.starts_with("data:") || lower.starts_with('/')
}

/// 资源候选解析器
///
/// 规则：先放记录自身给出的定位符，再放按 id 与目录约定推导出的路径，
/// 全部经 [`DataRoot`] 改写后去重。
#[derive(Debug, Clone, Default)]
pub struct AssetResolver {
    root: DataRoot,
}

impl AssetResolver {
    pub fn new(root: DataRoot) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &DataRoot {
        &self.root
    }

    /// 改写并去重
    pub fn build<I, S>(&self, kind: AssetKind, locators: I) -> AssetCandidateList
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        locators
            .into_iter()
            .filter_map(|locator| self.root.rewrite(kind, locator.as_ref()))
            .collect()
    }

    /// 角色立绘：记录字段 → 头像表条目 → `image/character_portrait/{id}.png`
    pub fn portrait(&self, explicit: &[String], avatar: Option<&Value>, id: Option<&str>) -> AssetCandidateList {
        let mut locators: Vec<String> = explicit.to_vec();
        if let Some(avatar) = avatar {
            locators.extend(
                AVATAR_PORTRAIT_FIELDS
                    .iter()
                    .filter_map(|field| avatar.get(*field).and_then(as_text)),
            );
        }
        if let Some(id) = id {
            locators.push(format!("image/character_portrait/{}.png", id));
        }
        self.build(AssetKind::Portrait, locators)
    }

    /// 元素图标
    pub fn element_icon(&self, code: &str) -> AssetCandidateList {
        self.build(
            AssetKind::ElementIcon,
            [format!("icon/element/{}.png", code), format!("image/element/{}.png", code)],
        )
    }

    /// 命途图标：描述对象的 `icon_small | icon`，再是小图标与普通图标
    pub fn path_icon(&self, descriptor: Option<&Value>, key: &str) -> AssetCandidateList {
        let mut locators: Vec<String> = descriptor
            .map(|d| {
                ["icon_small", "icon"]
                    .iter()
                    .filter_map(|field| d.get(*field).and_then(as_text))
                    .collect()
            })
            .unwrap_or_default();
        locators.push(format!("icon/path/{}Small.png", key));
        locators.push(format!("icon/path/{}.png", key));
        self.build(AssetKind::PathIcon, locators)
    }

    /// 技能图标：`{cid}_{basic_atk|skill|ultimate|talent|technique}.png`
    pub fn skill_icon(&self, owner_id: &str, ability: &AbilityRecord) -> AssetCandidateList {
        let mut locators: Vec<String> = ability.icon.iter().cloned().collect();
        if let Some(suffix) = ability.kind.icon_suffix() {
            locators.push(format!("image/character_skill/{}_{}.png", owner_id, suffix));
        }
        self.build(AssetKind::SkillIcon, locators)
    }

    /// 星魂图标：`{cid}_rank{n}.png`
    pub fn rank_icon(&self, owner_id: &str, rank: &RankRecord) -> AssetCandidateList {
        let mut locators: Vec<String> = rank.icon.iter().cloned().collect();
        if let Some(n) = rank.rank {
            locators.push(format!("image/character_rank/{}_rank{}.png", owner_id, n));
        }
        self.build(AssetKind::RankIcon, locators)
    }

    /// 行迹图标：`{cid}_skilltree{n}.png`，n 从 1 开始
    pub fn trace_icon(&self, owner_id: &str, node: &TraceNode, position: usize) -> AssetCandidateList {
        let mut locators: Vec<String> = node.icon.iter().cloned().collect();
        locators.push(format!("image/character_skilltree/{}_skilltree{}.png", owner_id, position.max(1)));
        self.build(AssetKind::TraceIcon, locators)
    }

    /// 遗器套装图标
    pub fn relic_icon(&self, relic: &RelicSet) -> AssetCandidateList {
        let mut locators: Vec<String> = relic.icon.iter().cloned().collect();
        if let Some(id) = &relic.id {
            locators.push(format!("icon/relic/{}.png", id));
            locators.push(format!("image/relic/{}.png", id));
            locators.push(format!("image/relic_set/{}.png", id));
        }
        self.build(AssetKind::RelicIcon, locators)
    }

    /// 光锥图标
    pub fn cone_icon(&self, cone: &LightCone) -> AssetCandidateList {
        let mut locators: Vec<String> = cone.icon.iter().cloned().collect();
        if let Some(id) = cone.id.as_ref().or(cone.eid.as_ref()) {
            locators.push(format!("image/light_cone/{}.png", id));
            locators.push(format!("icon/light_cone/{}.png", id));
        }
        self.build(AssetKind::ConeIcon, locators)
    }
}
