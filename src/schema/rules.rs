use serde_json::Value;

use crate::datatypes::{as_integer, as_number, as_text, get_path, is_present};

/// 从宽松 JSON 值中提取强类型值的纯函数
pub type Extract<T> = fn(&Value) -> Option<T>;

/// 单条字段提取规则：字段路径 + 提取函数
///
/// 路径可用点号访问嵌套字段（如 `i18n.en`）。
#[derive(Clone, Copy)]
pub struct FieldRule<T> {
    pub path: &'static str,
    pub extract: Extract<T>,
}

impl<T> std::fmt::Debug for FieldRule<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldRule").field("path", &self.path).finish()
    }
}

impl<T> FieldRule<T> {
    pub const fn new(path: &'static str, extract: Extract<T>) -> Self {
        Self { path, extract }
    }

    /// 应用规则到原始记录
    pub fn apply(&self, raw: &Value) -> Option<T> {
        get_path(raw, self.path).and_then(self.extract)
    }
}

/// 按优先级依次应用规则，取第一个成功结果
pub fn first_match<T>(raw: &Value, rules: &[FieldRule<T>]) -> Option<T> {
    rules.iter().find_map(|rule| rule.apply(raw))
}

/// 依次应用规则，收集所有成功结果（用于资源候选等多值字段）
pub fn all_matches<T>(raw: &Value, rules: &[FieldRule<T>]) -> Vec<T> {
    rules.iter().filter_map(|rule| rule.apply(raw)).collect()
}

/// 取第一个非 null 的字段值，不再尝试后续别名
///
/// 用于"第一个存在的值生效，之后再做类型转换"的字段（例如稀有度）。
pub fn first_present<'a>(raw: &'a Value, paths: &[&str]) -> Option<&'a Value> {
    paths
        .iter()
        .find_map(|path| get_path(raw, path).filter(|v| is_present(v)))
}

/// 生成一组共享同一提取函数的规则
pub const fn text_rule(path: &'static str) -> FieldRule<String> {
    FieldRule::new(path, as_text)
}

pub const fn number_rule(path: &'static str) -> FieldRule<f64> {
    FieldRule::new(path, as_number)
}

pub const fn integer_rule(path: &'static str) -> FieldRule<i64> {
    FieldRule::new(path, as_integer)
}
