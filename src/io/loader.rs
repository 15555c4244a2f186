/// 文档批量加载
///
/// 一次页面渲染所需的文档并行取回、统一等待；必需文档失败即整体失败，
/// 可选文档失败按缺失处理。文档本身不重试。
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rayon::prelude::*;
use serde_json::Value;

use super::traits::DocumentSource;
use crate::utils::CatalogError;

pub const CHARACTERS: &str = "characters.json";
pub const AVATARS: &str = "avatars.json";
pub const ELEMENTS: &str = "elements.json";
pub const PATHS: &str = "paths.json";
pub const NICKNAMES: &str = "nickname.json";
pub const SKILLS: &str = "character_skills.json";
pub const RANKS: &str = "character_ranks.json";
pub const SKILL_TREES: &str = "character_skill_trees.json";
pub const PROPERTIES: &str = "properties.json";
pub const LIGHT_CONES: &str = "light_cones.json";
pub const LIGHT_CONE_RANKS: &str = "light_cone_ranks.json";
pub const RELIC_SETS: &str = "relic_sets.json";

/// 角色覆盖文档的请求键
pub fn override_key(id: &str) -> String {
    format!("overrides/characters/{}.json", id)
}

/// 一个待加载的文档
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSpec {
    pub key: String,
    pub required: bool,
}

impl DocumentSpec {
    pub fn required(key: impl Into<String>) -> Self {
        Self { key: key.into(), required: true }
    }

    pub fn optional(key: impl Into<String>) -> Self {
        Self { key: key.into(), required: false }
    }

    /// 目录页需要的文档
    pub fn catalog_set() -> Vec<Self> {
        vec![
            Self::required(CHARACTERS),
            Self::optional(AVATARS),
            Self::required(ELEMENTS),
            Self::required(PATHS),
            Self::optional(NICKNAMES),
        ]
    }

    /// 角色页需要的文档（不含依赖角色 id 的覆盖文档）
    pub fn sheet_set() -> Vec<Self> {
        vec![
            Self::required(CHARACTERS),
            Self::optional(AVATARS),
            Self::optional(ELEMENTS),
            Self::required(PATHS),
            Self::optional(NICKNAMES),
            Self::required(SKILLS),
            Self::required(RANKS),
            Self::required(SKILL_TREES),
            Self::required(PROPERTIES),
            Self::required(LIGHT_CONES),
            Self::optional(LIGHT_CONE_RANKS),
            Self::required(RELIC_SETS),
        ]
    }
}

/// 一次加载的结果；可选文档缺失时不在其中
#[derive(Debug, Clone, Default)]
pub struct LoadedDocuments {
    documents: HashMap<String, Arc<Value>>,
}

impl LoadedDocuments {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.documents.get(key).map(Arc::as_ref)
    }

    /// 必需文档：缺失时报错
    pub fn expect_present(&self, key: &str) -> Result<&Value, CatalogError> {
        self.get(key)
            .ok_or_else(|| CatalogError::DocumentNotFound(key.to_string()))
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Arc<Value>) {
        self.documents.insert(key.into(), value);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.documents.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// 并行加载一组文档
///
/// # 返回
/// 任一必需文档失败时返回 `CatalogError::RequiredDocument`，不返回部分结果
pub fn load_documents<S>(source: &S, specs: &[DocumentSpec]) -> Result<LoadedDocuments, CatalogError>
where
    S: DocumentSource + ?Sized,
{
    let results: Vec<(&DocumentSpec, Result<Arc<Value>, CatalogError>)> = specs
        .par_iter()
        .map(|spec| (spec, source.fetch(&spec.key)))
        .collect();

    let mut loaded = LoadedDocuments::default();
    for (spec, result) in results {
        match result {
            Ok(value) => loaded.insert(spec.key.clone(), value),
            Err(err) if spec.required => {
                return Err(CatalogError::RequiredDocument {
                    key: spec.key.clone(),
                    reason: err.to_string(),
                });
            }
            Err(err) => {
                tracing::debug!(key = %spec.key, error = %err, "可选文档不可用，按缺失处理");
            }
        }
    }

    tracing::debug!(requested = specs.len(), loaded = loaded.len(), "文档加载完成");
    Ok(loaded)
}

/// 按顺序探测数据目录前缀，取第一个包含 `characters.json` 的目录
///
/// 都不存在时使用最后一个前缀。
pub fn resolve_index_dir(base: &Path, prefixes: &[String]) -> PathBuf {
    for prefix in prefixes {
        let candidate = base.join(prefix);
        if candidate.join(CHARACTERS).is_file() {
            tracing::debug!(dir = %candidate.display(), "已选定数据目录");
            return candidate;
        }
    }

    match prefixes.last() {
        Some(last) => base.join(last),
        None => base.to_path_buf(),
    }
}
