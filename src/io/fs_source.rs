/// 文档来源的默认实现
///
/// 提供基于文件系统和内存的两种 `DocumentSource`
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;

use super::traits::DocumentSource;
use crate::utils::CatalogError;

/// 以目录为根的文件系统来源
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 请求键对应的文件路径；拒绝绝对路径和 `..`
    fn path_for(&self, key: &str) -> Option<PathBuf> {
        let relative = Path::new(key);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        (!escapes).then(|| self.root.join(relative))
    }
}

impl DocumentSource for DirectorySource {
    fn fetch(&self, key: &str) -> Result<Arc<Value>, CatalogError> {
        let path = self
            .path_for(key)
            .filter(|p| p.is_file())
            .ok_or_else(|| CatalogError::DocumentNotFound(key.to_string()))?;

        let text = std::fs::read_to_string(&path)?;
        let value: Value = serde_json::from_str(&text)?;
        tracing::trace!(path = %path.display(), "已读取文档");
        Ok(Arc::new(value))
    }
}

/// 内存来源（测试与嵌入使用）
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    documents: HashMap<String, Arc<Value>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// 链式添加文档
    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.documents.insert(key.into(), Arc::new(value));
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl DocumentSource for MemorySource {
    fn fetch(&self, key: &str) -> Result<Arc<Value>, CatalogError> {
        self.documents
            .get(key)
            .cloned()
            .ok_or_else(|| CatalogError::DocumentNotFound(key.to_string()))
    }
}
