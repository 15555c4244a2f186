//! 数据结构规范化模块
//!
//! 把字段名和形状不断变化的原始 JSON 记录映射到规范记录。
//! 每个规范字段对应一组有序的 [`FieldRule`]，按优先级取第一个成功结果。

mod ability;
mod character;
mod equipment;
mod rules;

pub use ability::{AbilityKind, AbilityRecord, ParamTable, RankRecord, TraceNode};
pub use character::{CharacterRecord, DEFAULT_RARITY, UNKNOWN_NAME};
pub use equipment::{CharacterOverride, LightCone, LightConeRank, RelicRef, RelicSet, Team, DEFAULT_TEAM_NAME};
pub use rules::{all_matches, first_match, first_present, FieldRule};

use serde_json::Value;

use crate::datatypes::{records_from_payload, RawRecord};

/// 规范化整份文档：先统一解包形状，再逐条应用规范化函数
pub fn normalize_all<T>(payload: &Value, normalize: fn(&RawRecord) -> T) -> Vec<T> {
    records_from_payload(payload).iter().map(normalize).collect()
}

/// 可选文档：缺失时得到空列表
pub fn normalize_optional<T>(payload: Option<&Value>, normalize: fn(&RawRecord) -> T) -> Vec<T> {
    payload.map(|p| normalize_all(p, normalize)).unwrap_or_default()
}
