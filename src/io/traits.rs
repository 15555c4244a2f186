/// 文档加载 trait 定义
///
/// 实现者只负责按键取回已解析的 JSON，不做规范化。
use std::sync::Arc;

use serde_json::Value;

use crate::utils::CatalogError;

/// JSON 文档来源
///
/// # 职责
/// - 按请求键（相对路径，如 `characters.json`）取回解析后的文档
/// - 文档一经取回即不可变，因此以 `Arc` 共享
///
/// # 实现示例
/// ```rust,ignore
/// pub struct StaticSource(Arc<Value>);
/// impl DocumentSource for StaticSource {
///     fn fetch(&self, _key: &str) -> Result<Arc<Value>, CatalogError> {
///         Ok(self.0.clone())
///     }
/// }
/// ```
pub trait DocumentSource: Send + Sync {
    /// 取回文档
    ///
    /// # 返回
    /// 文档不存在时返回 `CatalogError::DocumentNotFound`
    fn fetch(&self, key: &str) -> Result<Arc<Value>, CatalogError>;
}

impl<S: DocumentSource + ?Sized> DocumentSource for &S {
    fn fetch(&self, key: &str) -> Result<Arc<Value>, CatalogError> {
        (**self).fetch(key)
    }
}

impl<S: DocumentSource + ?Sized> DocumentSource for Box<S> {
    fn fetch(&self, key: &str) -> Result<Arc<Value>, CatalogError> {
        (**self).fetch(key)
    }
}
