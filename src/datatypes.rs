use serde_json::Value;

/// 包装对象中可能承载记录列表的属性名
/// 包裹记录列表的字段名
pub(crate) const NESTED_LIST_KEYS: &[&str] = &["characters", "data", "list", "items"];

/// 从原始文档中拆出的一条记录
///
/// `key` 仅在文档是以 id 为键的对象时存在，作为最后兜底的 id 来源。
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub key: Option<String>,
    pub value: Value,
}

impl RawRecord {
    pub fn new(key: Option<String>, value: Value) -> Self {
        Self { key, value }
    }
}

/// 统一解包三种文档形状：顶层数组 / 值为记录的对象 / 带嵌套列表属性的对象
///
/// 非对象条目会被丢弃；标量文档得到空列表（目录渲染为空而不是报错）。
pub fn records_from_payload(payload: &Value) -> Vec<RawRecord> {
    match payload {
        Value::Array(items) => collect_objects(items.iter().map(|v| (None, v))),
        Value::Object(map) => {
            for key in NESTED_LIST_KEYS {
                if let Some(Value::Array(items)) = map.get(*key) {
                    return collect_objects(items.iter().map(|v| (None, v)));
                }
            }
            collect_objects(map.iter().map(|(k, v)| (Some(k.clone()), v)))
        }
        Value::Null => Vec::new(),
        other => {
            tracing::warn!(kind = value_kind(other), "文档既不是数组也不是对象，按空列表处理");
            Vec::new()
        }
    }
}

fn collect_objects<'a, I>(items: I) -> Vec<RawRecord>
where
    I: Iterator<Item = (Option<String>, &'a Value)>,
{
    let mut skipped = 0usize;
    let records: Vec<RawRecord> = items
        .filter_map(|(key, value)| {
            if value.is_object() {
                Some(RawRecord::new(key, value.clone()))
            } else {
                skipped += 1;
                None
            }
        })
        .collect();

    if skipped > 0 {
        tracing::debug!(skipped, kept = records.len(), "跳过非对象条目");
    }
    records
}

/// JSON 值类型名（日志用）
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// 按点分隔路径读取嵌套字段（例如 `i18n.en`）
pub fn get_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(value, |current, segment| current.get(segment))
}

/// 宽松文本：字符串（去空白后非空）或数字
pub fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// 宽松数字：数字或可解析的数字字符串（逗号小数也接受）
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', ".").parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

/// 宽松整数：数字（必须是整数值）或整数字符串
pub fn as_integer(value: &Value) -> Option<i64> {
    as_number(value).filter(|v| v.fract() == 0.0).map(|v| v as i64)
}

/// 字符串列表：数组中的文本项，单个文本视为一项列表
pub fn as_text_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(as_text).collect(),
        other => as_text(other).into_iter().collect(),
    }
}

/// 该值是否"存在"（非 null）
pub fn is_present(value: &Value) -> bool {
    !value.is_null()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_array() {
        let records = records_from_payload(&json!([{"id": 1}, 5, {"id": 2}]));
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.key.is_none()));
    }

    #[test]
    fn test_payload_keyed_object() {
        let records = records_from_payload(&json!({"1310": {"name": "Luciole"}, "1307": {"name": "Black Swan"}}));
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].key.as_deref(), Some("1310"));
        assert_eq!(records[1].key.as_deref(), Some("1307"));
    }

    #[test]
    fn test_payload_nested_list() {
        let records = records_from_payload(&json!({"version": 3, "characters": [{"id": "1"}]}));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].value["id"], "1");
    }

    #[test]
    fn test_payload_scalar() {
        assert!(records_from_payload(&json!("oops")).is_empty());
        assert!(records_from_payload(&Value::Null).is_empty());
    }

    #[test]
    fn test_coercions() {
        assert_eq!(as_text(&json!(1310)), Some("1310".to_string()));
        assert_eq!(as_text(&json!("  ")), None);
        assert_eq!(as_number(&json!("4")), Some(4.0));
        assert_eq!(as_number(&json!("0,5")), Some(0.5));
        assert_eq!(as_number(&json!("abc")), None);
        assert_eq!(as_integer(&json!(2.5)), None);
        assert_eq!(as_text_list(&json!(["a", 1, null])), vec!["a", "1"]);
    }

    #[test]
    fn test_get_path() {
        let v = json!({"i18n": {"en": "Firefly"}});
        assert_eq!(get_path(&v, "i18n.en"), Some(&json!("Firefly")));
        assert_eq!(get_path(&v, "i18n.de"), None);
    }
}
