//! 角色目录
//!
//! 把角色文档与查找表组装成可筛选、可排序的规范记录列表。

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::assets::{AssetCandidateList, AssetResolver};
use crate::config::CatalogConfig;
use crate::datatypes::records_from_payload;
use crate::io::{LoadedDocuments, AVATARS, CHARACTERS, ELEMENTS, NICKNAMES, PATHS};
use crate::labels::{LabelTranslator, PathLabel};
use crate::lookup::LookupTable;
use crate::nickname::NicknameResolver;
use crate::schema::CharacterRecord;
use crate::utils::{fold_text, make_slug, words, CatalogError};

/// 构建目录所需的原始文档
#[derive(Debug, Clone, Copy)]
pub struct CatalogSources<'a> {
    pub characters: &'a Value,
    pub avatars: Option<&'a Value>,
    pub elements: Option<&'a Value>,
    pub paths: Option<&'a Value>,
    pub nicknames: Option<&'a Value>,
}

impl<'a> CatalogSources<'a> {
    pub fn new(characters: &'a Value) -> Self {
        Self {
            characters,
            avatars: None,
            elements: None,
            paths: None,
            nicknames: None,
        }
    }

    /// 从一次加载的结果中取出；角色文档必须存在
    pub fn from_documents(documents: &'a LoadedDocuments) -> Result<Self, CatalogError> {
        Ok(Self {
            characters: documents.expect_present(CHARACTERS)?,
            avatars: documents.get(AVATARS),
            elements: documents.get(ELEMENTS),
            paths: documents.get(PATHS),
            nicknames: documents.get(NICKNAMES),
        })
    }
}

/// 每次加载构建一次的只读查找表
#[derive(Debug, Clone, Default)]
pub struct Lookups {
    pub avatars: LookupTable,
    pub elements: LookupTable,
    pub paths: LookupTable,
    pub nicknames: LookupTable,
}

impl Lookups {
    pub fn from_sources(sources: &CatalogSources<'_>) -> Self {
        Lookups {
            avatars: LookupTable::from_optional(sources.avatars),
            elements: LookupTable::from_optional(sources.elements),
            paths: LookupTable::from_optional(sources.paths),
            nicknames: LookupTable::from_optional(sources.nicknames),
        }
    }
}

/// 筛选按钮
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chip {
    pub id: String,
    pub label: String,
    pub icon_candidates: AssetCandidateList,
}

/// 排序方式（同值时按名称）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Name,
    /// 稀有度降序
    Rarity,
    Element,
    Path,
}

impl std::str::FromStr for SortKey {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" | "nom" => Ok(SortKey::Name),
            "rarity" | "rarete" => Ok(SortKey::Rarity),
            "element" => Ok(SortKey::Element),
            "path" | "voie" => Ok(SortKey::Path),
            other => Err(CatalogError::InvalidConfig(format!("unknown sort key: {}", other))),
        }
    }
}

/// 目录查询条件
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogQuery {
    /// 名称子串（显示名或英文名，大小写与重音不敏感）
    pub name: Option<String>,
    pub element: Option<String>,
    /// 命途 id 或去冠词后的命途标签
    pub path: Option<String>,
    pub rarity: Option<i64>,
    pub sort: SortKey,
}

/// 已解析的角色目录
#[derive(Debug, Clone)]
pub struct Catalog {
    records: Vec<CharacterRecord>,
    by_id: HashMap<String, usize>,
    lookups: Lookups,
    labels: LabelTranslator,
    element_chips: Vec<Chip>,
    path_chips: Vec<Chip>,
}

impl Catalog {
    /// 规范化并解析全部角色
    pub fn build(
        sources: CatalogSources<'_>,
        config: &CatalogConfig,
        resolver: &AssetResolver,
    ) -> Result<Self, CatalogError> {
        let lookups = Lookups::from_sources(&sources);
        let labels = LabelTranslator::new(&lookups.elements, &lookups.paths)?;
        let nicknames = NicknameResolver::new(&lookups.nicknames, config);

        let raw_records = records_from_payload(sources.characters);
        let total = raw_records.len();
        let mut excluded = 0usize;
        let mut records = Vec::with_capacity(total);

        for raw in &raw_records {
            let mut record = CharacterRecord::normalize(raw);
            if record.id_str().is_some_and(|id| config.is_excluded(id)) {
                excluded += 1;
                continue;
            }
            resolve_record(&mut record, &lookups, &nicknames, resolver);
            records.push(record);
        }

        let mut by_id = HashMap::new();
        for (index, record) in records.iter().enumerate() {
            let Some(id) = record.id_str() else { continue };
            if by_id.contains_key(id) {
                tracing::warn!(id, name = %record.name, "重复的角色 id，保留第一条");
                continue;
            }
            by_id.insert(id.to_string(), index);
        }

        let element_chips = element_chips(&lookups, &labels, &records, resolver);
        let path_chips = path_chips(&lookups, &labels, &records, resolver);

        tracing::info!(
            total,
            kept = records.len(),
            excluded,
            indexed = by_id.len(),
            "角色目录构建完成"
        );

        Ok(Catalog {
            records,
            by_id,
            lookups,
            labels,
            element_chips,
            path_chips,
        })
    }

    /// 全部记录（含缺名与缺 id 的记录）
    pub fn records(&self) -> &[CharacterRecord] {
        &self.records
    }

    /// 可展示的记录：名称不是占位名
    pub fn visible(&self) -> impl Iterator<Item = &CharacterRecord> {
        self.records.iter().filter(|r| !r.is_unnamed())
    }

    pub fn get(&self, id: &str) -> Option<&CharacterRecord> {
        self.by_id.get(id).map(|&index| &self.records[index])
    }

    pub fn lookups(&self) -> &Lookups {
        &self.lookups
    }

    pub fn labels(&self) -> &LabelTranslator {
        &self.labels
    }

    pub fn element_chips(&self) -> &[Chip] {
        &self.element_chips
    }

    pub fn path_chips(&self) -> &[Chip] {
        &self.path_chips
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 元素显示标签
    pub fn element_label(&self, record: &CharacterRecord) -> Option<String> {
        record.element_id.as_deref().map(|id| self.labels.element_label(id))
    }

    /// 命途标签
    pub fn path_label(&self, record: &CharacterRecord) -> Option<PathLabel> {
        record.path_id.as_deref().map(|id| self.labels.path_label(id))
    }

    /// 按 id、slug 或名称中的整词查找
    pub fn find(&self, key: &str) -> Option<&CharacterRecord> {
        let key = key.trim();
        if key.is_empty() {
            return None;
        }
        if let Some(found) = self.get(key) {
            return Some(found);
        }

        let slug = make_slug(key);
        if let Some(found) = self.visible().find(|r| !slug.is_empty() && r.slug == slug) {
            return Some(found);
        }

        let folded = fold_text(key);
        self.visible().find(|r| {
            fold_text(&r.name) == folded
                || words(&r.name).iter().any(|w| *w == folded)
                || r.english_name.as_deref().is_some_and(|en| fold_text(en) == folded)
        })
    }

    /// 筛选并排序可展示的记录
    pub fn query(&self, query: &CatalogQuery) -> Vec<&CharacterRecord> {
        let needle = query.name.as_deref().map(fold_text).filter(|n| !n.is_empty());

        let mut list: Vec<&CharacterRecord> = self
            .visible()
            .filter(|r| match &needle {
                Some(needle) => {
                    fold_text(&r.name).contains(needle.as_str())
                        || r.english_name.as_deref().is_some_and(|en| fold_text(en).contains(needle.as_str()))
                }
                None => true,
            })
            .filter(|r| match query.element.as_deref() {
                Some(element) => r.element_id.as_deref().is_some_and(|id| fold_text(id) == fold_text(element)),
                None => true,
            })
            .filter(|r| match query.path.as_deref() {
                Some(path) => self.matches_path(r, path),
                None => true,
            })
            .filter(|r| query.rarity.map_or(true, |rarity| r.rarity == rarity))
            .collect();

        list.sort_by(|a, b| self.compare(a, b, query.sort));
        list
    }

    fn matches_path(&self, record: &CharacterRecord, path: &str) -> bool {
        let Some(path_id) = record.path_id.as_deref() else {
            return false;
        };
        fold_text(path_id) == fold_text(path) || self.labels.path_label(path_id).matches_filter(path)
    }

    fn compare(&self, a: &CharacterRecord, b: &CharacterRecord, sort: SortKey) -> Ordering {
        let primary = match sort {
            SortKey::Name => Ordering::Equal,
            SortKey::Rarity => b.rarity.cmp(&a.rarity),
            SortKey::Element => fold_option(&a.element_id).cmp(&fold_option(&b.element_id)),
            SortKey::Path => fold_option(&a.path_id).cmp(&fold_option(&b.path_id)),
        };
        primary
            .then_with(|| fold_text(&a.name).cmp(&fold_text(&b.name)))
            .then_with(|| a.name.cmp(&b.name))
    }
}

fn fold_option(value: &Option<String>) -> String {
    value.as_deref().map(fold_text).unwrap_or_default()
}

/// 显示名、英文名、slug 与立绘候选
fn resolve_record(
    record: &mut CharacterRecord,
    lookups: &Lookups,
    nicknames: &NicknameResolver<'_>,
    resolver: &AssetResolver,
) {
    let raw_name = record.name.clone();
    let id = record.id.clone();

    record.name = nicknames.resolve_display(&raw_name, id.as_deref());
    record.english_name = nicknames.english_name(record.english_name.as_deref(), id.as_deref(), &raw_name);
    record.slug = make_slug(record.english_name.as_deref().unwrap_or(&record.name));

    let raw_slug = make_slug(&raw_name);
    let mut avatar_keys: Vec<&str> = Vec::with_capacity(3);
    if let Some(id) = id.as_deref() {
        avatar_keys.push(id);
    }
    avatar_keys.push(&raw_name);
    if !raw_slug.is_empty() {
        avatar_keys.push(&raw_slug);
    }
    let avatar = lookups.avatars.get_first(avatar_keys);

    record.portrait_candidates = resolver.portrait(&record.explicit_portraits, avatar, id.as_deref());
}

/// 元素筛选按钮：查找表为空时按记录中出现的顺序生成
fn element_chips(
    lookups: &Lookups,
    labels: &LabelTranslator,
    records: &[CharacterRecord],
    resolver: &AssetResolver,
) -> Vec<Chip> {
    chip_ids(&lookups.elements, records, |r| r.element_id.as_deref())
        .into_iter()
        .map(|id| Chip {
            label: labels.element_label(&id),
            icon_candidates: resolver.element_icon(&id),
            id,
        })
        .collect()
}

/// 命途筛选按钮，标签去掉冠词
fn path_chips(
    lookups: &Lookups,
    labels: &LabelTranslator,
    records: &[CharacterRecord],
    resolver: &AssetResolver,
) -> Vec<Chip> {
    chip_ids(&lookups.paths, records, |r| r.path_id.as_deref())
        .into_iter()
        .map(|id| Chip {
            label: labels.path_label(&id).filter,
            icon_candidates: resolver.path_icon(lookups.paths.get(&id), &id),
            id,
        })
        .collect()
}

fn chip_ids(table: &LookupTable, records: &[CharacterRecord], field: fn(&CharacterRecord) -> Option<&str>) -> Vec<String> {
    if !table.is_empty() {
        return table.iter().map(|(key, _)| key.clone()).collect();
    }
    let mut ids: Vec<String> = Vec::new();
    for id in records.iter().filter_map(field) {
        if !ids.iter().any(|seen| seen == id) {
            ids.push(id.to_string());
        }
    }
    ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::DataRoot;
    use serde_json::json;

    fn characters() -> Value {
        json!([
            {"id": "1310", "name": "Luciole", "element": "Fire", "path": "Knight", "rarity": 5},
            {"avatar_id": 1307, "Name": "Cygne Noir", "Element": "Wind", "Path": "Warlock", "star": 5},
            {"id": "8001", "name": "{NICKNAME}", "element": "Physical", "path": "Warrior", "rarity": 5},
            {"id": "8002", "name": "{NICKNAME}", "element": "Physical", "path": "Warrior", "rarity": 5},
            {"id": "1001", "name": "March 7th", "element": "Ice", "path": "Knight", "rarity": 4},
            {"element": "Ice"}
        ])
    }

    fn catalog() -> Catalog {
        let characters = characters();
        let paths = json!({
            "Knight": {"name": "La Préservation"},
            "Warlock": {"name": "La Nihilité"},
            "Warrior": {"name": "La Destruction"}
        });
        let mut sources = CatalogSources::new(&characters);
        sources.paths = Some(&paths);
        let resolver = AssetResolver::new(DataRoot::new("/data"));
        Catalog::build(sources, &CatalogConfig::default(), &resolver).unwrap()
    }

    #[test]
    fn test_build_excludes_and_resolves() {
        let catalog = catalog();
        assert_eq!(catalog.len(), 5);
        assert!(catalog.get("8001").is_none());

        let trail = catalog.get("8002").unwrap();
        assert_eq!(trail.name, "Pionnière");

        let swan = catalog.get("1307").unwrap();
        assert_eq!(swan.english_name.as_deref(), Some("Black Swan"));
        assert_eq!(swan.slug, "black_swan");
        assert_eq!(swan.portrait_candidates.first(), Some("/data/image/character_portrait/1307.png"));
    }

    #[test]
    fn test_unnamed_records_hidden() {
        let catalog = catalog();
        assert_eq!(catalog.visible().count(), 4);
        assert!(catalog.records().iter().any(|r| r.id.is_none()));
    }

    #[test]
    fn test_query_filters() {
        let catalog = catalog();
        let by_name = catalog.query(&CatalogQuery { name: Some("fire".into()), ..Default::default() });
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].name, "Luciole");

        let by_path_label = catalog.query(&CatalogQuery { path: Some("Préservation".into()), ..Default::default() });
        let names: Vec<&str> = by_path_label.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Luciole", "March 7th"]);

        let four_star = catalog.query(&CatalogQuery { rarity: Some(4), ..Default::default() });
        assert_eq!(four_star.len(), 1);
    }

    #[test]
    fn test_sort_by_rarity_then_name() {
        let catalog = catalog();
        let list = catalog.query(&CatalogQuery { sort: SortKey::Rarity, ..Default::default() });
        let names: Vec<&str> = list.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Cygne Noir", "Luciole", "Pionnière", "March 7th"]);
    }

    #[test]
    fn test_find_by_id_slug_and_word() {
        let catalog = catalog();
        assert_eq!(catalog.find("1310").map(|r| r.name.as_str()), Some("Luciole"));
        assert_eq!(catalog.find("black_swan").map(|r| r.name.as_str()), Some("Cygne Noir"));
        assert_eq!(catalog.find("cygne").map(|r| r.name.as_str()), Some("Cygne Noir"));
        assert!(catalog.find("personne").is_none());
    }

    #[test]
    fn test_chips() {
        let catalog = catalog();
        let path_labels: Vec<&str> = catalog.path_chips().iter().map(|c| c.label.as_str()).collect();
        assert_eq!(path_labels, vec!["Préservation", "Nihilité", "Destruction"]);

        // 没有元素文档时按记录出现顺序生成
        let element_ids: Vec<&str> = catalog.element_chips().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(element_ids, vec!["Fire", "Wind", "Physical", "Ice"]);
        assert_eq!(catalog.element_chips()[0].label, "Feu");
    }

    #[test]
    fn test_sort_key_from_str() {
        assert_eq!("rarity".parse::<SortKey>().unwrap(), SortKey::Rarity);
        assert!("size".parse::<SortKey>().is_err());
    }
}
