//! 昵称解析
//!
//! 替换显示名中的占位符（开拓者的称呼），并从昵称表推断英文名。

use serde_json::Value;

use crate::config::CatalogConfig;
use crate::datatypes::as_text;
use crate::lookup::LookupTable;
use crate::utils::{looks_like_proper_noun, make_slug};

/// 昵称对象中英文名字段（按优先级）
const ENGLISH_FIELDS: &[&str] = &["en", "english", "display_en"];

/// 昵称解析器
///
/// 纯函数：只读取构造时注入的昵称表和配置。
#[derive(Debug, Clone, Copy)]
pub struct NicknameResolver<'a> {
    nicknames: &'a LookupTable,
    config: &'a CatalogConfig,
}

impl<'a> NicknameResolver<'a> {
    pub fn new(nicknames: &'a LookupTable, config: &'a CatalogConfig) -> Self {
        Self { nicknames, config }
    }

    /// 替换显示名中的占位符
    ///
    /// 顺序：按 id 的变体覆盖 → 昵称表（id、原名、slug）→ 默认称呼。
    /// 不含占位符的名称原样返回。
    pub fn resolve_display(&self, name: &str, id: Option<&str>) -> String {
        let token = self.config.placeholder_token.as_str();
        if !name.contains(token) {
            return name.to_string();
        }

        let replacement = id
            .and_then(|id| self.config.variant_nicknames.get(id).cloned())
            .or_else(|| self.lookup(id, name).and_then(nickname_text))
            .unwrap_or_else(|| self.config.default_nickname.clone());

        name.replace(token, &replacement)
    }

    /// 推断英文名（仅用于搜索与 slug）
    ///
    /// 顺序：记录自带字段 → 昵称表 → 静态兜底表。
    pub fn english_name(&self, own: Option<&str>, id: Option<&str>, name: &str) -> Option<String> {
        if let Some(own) = own {
            return Some(own.to_string());
        }
        if let Some(found) = self.lookup(id, name).and_then(nickname_text) {
            return Some(found);
        }
        id.and_then(|id| self.config.english_name_overrides.get(id).cloned())
    }

    /// 依次按 id、原名、slug 查找昵称表
    fn lookup(&self, id: Option<&str>, name: &str) -> Option<&'a Value> {
        let slug = make_slug(name);
        let table: &'a LookupTable = self.nicknames;
        id.and_then(|id| table.get(id))
            .or_else(|| table.get(name))
            .or_else(|| (!slug.is_empty()).then(|| table.get(&slug)).flatten())
    }
}

/// 从昵称表的值中取名字
///
/// - 字符串：直接使用
/// - 列表：第一个同时含大小写字母的条目（启发式，可能误判）
/// - 对象：读取英文名字段
fn nickname_text(value: &Value) -> Option<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(as_text)
            .find(|candidate| looks_like_proper_noun(candidate)),
        Value::Object(_) => ENGLISH_FIELDS
            .iter()
            .find_map(|field| value.get(*field).and_then(as_text)),
        other => as_text(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table(value: Value) -> LookupTable {
        LookupTable::from_value(&value)
    }

    #[test]
    fn test_no_placeholder_is_identity() {
        let config = CatalogConfig::default();
        let nicks = table(json!({"1310": ["luciole", "Firefly"]}));
        let resolver = NicknameResolver::new(&nicks, &config);
        assert_eq!(resolver.resolve_display("Luciole", Some("1310")), "Luciole");
        let once = resolver.resolve_display("{NICKNAME}", Some("8002"));
        assert_eq!(resolver.resolve_display(&once, Some("8002")), once);
    }

    #[test]
    fn test_variant_override_wins() {
        let config = CatalogConfig::default();
        let nicks = table(json!({"8002": "Stelle"}));
        let resolver = NicknameResolver::new(&nicks, &config);
        assert_eq!(resolver.resolve_display("{NICKNAME} • Destruction", Some("8002")), "Pionnière • Destruction");
    }

    #[test]
    fn test_lookup_then_default() {
        let config = CatalogConfig::default();
        let nicks = table(json!({"9001": ["nom", "Vagabond"]}));
        let resolver = NicknameResolver::new(&nicks, &config);
        assert_eq!(resolver.resolve_display("{NICKNAME}", Some("9001")), "Vagabond");
        assert_eq!(resolver.resolve_display("{NICKNAME}", Some("9002")), "Pionnier");
    }

    #[test]
    fn test_english_name_sources() {
        let config = CatalogConfig::default();
        let nicks = table(json!({
            "1005": ["kafka", "Kafka"],
            "Luciole": {"en": "Firefly"},
            "march_7th": "March 7th"
        }));
        let resolver = NicknameResolver::new(&nicks, &config);

        assert_eq!(resolver.english_name(Some("Own"), Some("1005"), "Kafka").as_deref(), Some("Own"));
        assert_eq!(resolver.english_name(None, Some("1005"), "Kafka").as_deref(), Some("Kafka"));
        assert_eq!(resolver.english_name(None, Some("9999"), "Luciole").as_deref(), Some("Firefly"));
        assert_eq!(resolver.english_name(None, None, "March 7th").as_deref(), Some("March 7th"));
        assert_eq!(resolver.english_name(None, Some("1307"), "Cygne Noir").as_deref(), Some("Black Swan"));
        assert_eq!(resolver.english_name(None, Some("42"), "Personne"), None);
    }

    #[test]
    fn test_list_without_proper_noun() {
        let config = CatalogConfig::default();
        let nicks = table(json!({"1": ["abc", "DEF"]}));
        let resolver = NicknameResolver::new(&nicks, &config);
        assert_eq!(resolver.english_name(None, Some("1"), "x"), None);
    }
}
