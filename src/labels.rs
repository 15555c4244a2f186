//! 元素 / 命途标签翻译
//!
//! 查找顺序：加载的元素/命途文档 → 内置英文别名表 → 原样返回。
//! 所有键都经过大小写与重音折叠。

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::lookup::{descriptor_label, LookupTable};
use crate::utils::{fold_text, CatalogError};

/// 命途标签中需要去掉的法语定冠词
const ARTICLE_PREFIXES: &[&str] = &["L’", "L'", "La ", "Le ", "Les "];

/// 内置别名表（英文元素/命途名 → 法语标签）
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StaticLabels {
    #[serde(default)]
    pub elements: BTreeMap<String, String>,
    #[serde(default)]
    pub paths: BTreeMap<String, String>,
}

impl StaticLabels {
    /// 加载内置的 static_labels.json
    pub fn embedded() -> Result<Self, CatalogError> {
        let json_data = include_str!("../data/static_labels.json");
        Ok(serde_json::from_str(json_data)?)
    }
}

/// 命途标签的两种形式
///
/// `display` 保留冠词用于一般展示，`filter` 去掉冠词用于筛选按钮和筛选比较。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathLabel {
    pub display: String,
    pub filter: String,
}

impl PathLabel {
    pub fn new(display: String) -> Self {
        let filter = strip_article(&display);
        Self { display, filter }
    }

    /// 筛选比较（大小写与重音不敏感）
    pub fn matches_filter(&self, query: &str) -> bool {
        fold_text(&self.filter) == fold_text(&strip_article(query))
    }
}

/// 标签翻译器
#[derive(Debug, Clone, Default)]
pub struct LabelTranslator {
    elements: HashMap<String, String>,
    paths: HashMap<String, String>,
    element_aliases: HashMap<String, String>,
    path_aliases: HashMap<String, String>,
}

impl LabelTranslator {
    /// 使用内置别名表构建
    pub fn new(elements: &LookupTable, paths: &LookupTable) -> Result<Self, CatalogError> {
        Ok(Self::with_static(elements, paths, &StaticLabels::embedded()?))
    }

    pub fn with_static(elements: &LookupTable, paths: &LookupTable, aliases: &StaticLabels) -> Self {
        LabelTranslator {
            elements: index_table(elements),
            paths: index_table(paths),
            element_aliases: fold_keys(&aliases.elements),
            path_aliases: fold_keys(&aliases.paths),
        }
    }

    /// 元素显示标签
    pub fn element_label(&self, ident: &str) -> String {
        translate(ident, &self.elements, &self.element_aliases)
    }

    /// 命途标签（同时给出展示形式与筛选形式）
    pub fn path_label(&self, ident: &str) -> PathLabel {
        PathLabel::new(translate(ident, &self.paths, &self.path_aliases))
    }
}

fn translate(ident: &str, table: &HashMap<String, String>, aliases: &HashMap<String, String>) -> String {
    let key = fold_text(ident);
    table
        .get(&key)
        .or_else(|| aliases.get(&key))
        .cloned()
        .unwrap_or_else(|| ident.to_string())
}

/// 文档中的每个条目同时以 id、显示名、`id` 字段三种折叠形式登记
fn index_table(table: &LookupTable) -> HashMap<String, String> {
    let mut index = HashMap::new();
    for (key, descriptor) in table.iter() {
        let label = descriptor_label(descriptor).unwrap_or_else(|| key.clone());
        index.entry(fold_text(key)).or_insert_with(|| label.clone());
        if let Some(id) = descriptor.get("id").and_then(crate::datatypes::as_text) {
            index.entry(fold_text(&id)).or_insert_with(|| label.clone());
        }
        index.entry(fold_text(&label)).or_insert(label);
    }
    index
}

fn fold_keys(map: &BTreeMap<String, String>) -> HashMap<String, String> {
    map.iter().map(|(k, v)| (fold_text(k), v.clone())).collect()
}

/// 去掉开头的法语定冠词（大小写不敏感）
pub fn strip_article(label: &str) -> String {
    let trimmed = label.trim();
    for prefix in ARTICLE_PREFIXES {
        let count = prefix.chars().count();
        let head: String = trimmed.chars().take(count).collect();
        if head.to_lowercase() == prefix.to_lowercase() {
            return trimmed.chars().skip(count).collect::<String>().trim().to_string();
        }
    }
    trimmed.to_string()
}
