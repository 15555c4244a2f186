/// 按请求键缓存的文档来源
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde_json::Value;

use super::traits::DocumentSource;
use crate::utils::CatalogError;

/// 只读穿透缓存
///
/// 键为精确的请求键；条目存入后不再修改，失败结果不缓存。
#[derive(Debug)]
pub struct CachedSource<S> {
    inner: S,
    entries: RwLock<HashMap<String, Arc<Value>>>,
}

impl<S: DocumentSource> CachedSource<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// 已缓存的条目数
    pub fn cached_len(&self) -> usize {
        self.entries.read().map(|entries| entries.len()).unwrap_or(0)
    }

    fn cached(&self, key: &str) -> Option<Arc<Value>> {
        let entries = self.entries.read().ok()?;
        entries.get(key).cloned()
    }
}

impl<S: DocumentSource> DocumentSource for CachedSource<S> {
    fn fetch(&self, key: &str) -> Result<Arc<Value>, CatalogError> {
        if let Some(hit) = self.cached(key) {
            tracing::trace!(key, "缓存命中");
            return Ok(hit);
        }

        let value = self.inner.fetch(key)?;
        if let Ok(mut entries) = self.entries.write() {
            // 并发请求同一个键时保留先写入的条目
            let stored = entries.entry(key.to_string()).or_insert(value);
            return Ok(stored.clone());
        }
        Ok(value)
    }
}
