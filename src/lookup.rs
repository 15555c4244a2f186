//! 查找表
//!
//! 元素、命途、昵称、头像等文档可能是数组，也可能是以 id 为键的对象。
//! 这里统一成有序的 id → 描述对象映射，每次加载构建一次，之后只读。

use indexmap::IndexMap;
use serde_json::Value;

use crate::datatypes::{as_text, records_from_payload, NESTED_LIST_KEYS};

/// 数组形式文档中用作键的字段（按优先级）
const KEY_FIELDS: &[&str] = &["id", "key", "value", "name", "text"];

/// 描述对象中用作显示名称的字段（按优先级）
const LABEL_FIELDS: &[&str] = &["name", "text", "Title"];

/// 有序查找表
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LookupTable {
    entries: IndexMap<String, Value>,
}

impl LookupTable {
    /// 从任意形状的文档构建查找表
    ///
    /// - 数组：每项按 `id | key | value | name | text` 取键，取不到键的项被丢弃
    /// - 包装对象（含 `data`/`list` 等数组属性）：按数组处理
    /// - 普通对象：保留原键与任意形状的值（昵称表的值可能是字符串或数组）
    pub fn from_value(payload: &Value) -> Self {
        let mut entries = IndexMap::new();

        match payload {
            Value::Object(map) if !is_wrapper(map) => {
                for (key, value) in map {
                    entries.insert(key.clone(), value.clone());
                }
            }
            Value::Array(_) | Value::Object(_) => {
                for record in records_from_payload(payload) {
                    match Self::probe_key(&record.value) {
                        Some(key) => {
                            entries.insert(key, record.value);
                        }
                        None => tracing::debug!("查找表条目缺少可用键，已跳过"),
                    }
                }
            }
            _ => {}
        }

        Self { entries }
    }

    /// 可选文档：缺失时得到空表
    pub fn from_optional(payload: Option<&Value>) -> Self {
        payload.map(Self::from_value).unwrap_or_default()
    }

    fn probe_key(value: &Value) -> Option<String> {
        KEY_FIELDS.iter().find_map(|field| value.get(*field).and_then(as_text))
    }

    /// 按键查找
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// 依次尝试多个键，返回第一个命中
    pub fn get_first<'a, I>(&self, keys: I) -> Option<&Value>
    where
        I: IntoIterator<Item = &'a str>,
    {
        keys.into_iter().find_map(|key| self.get(key))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// 按文档顺序遍历
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter()
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 条目的显示名称：`name | text | Title`，都没有时返回键本身
    pub fn label_of(&self, key: &str) -> Option<String> {
        self.get(key).map(|value| descriptor_label(value).unwrap_or_else(|| key.to_string()))
    }
}

/// 描述对象的显示名称
pub fn descriptor_label(value: &Value) -> Option<String> {
    LABEL_FIELDS.iter().find_map(|field| value.get(*field).and_then(as_text))
}

fn is_wrapper(map: &serde_json::Map<String, Value>) -> bool {
    NESTED_LIST_KEYS
        .iter()
        .any(|key| matches!(map.get(*key), Some(Value::Array(_))))
}
