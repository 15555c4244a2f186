use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::assets::AssetCandidateList;
use crate::datatypes::{as_number, as_text_list, RawRecord};
use crate::utils::make_slug;

use super::rules::{all_matches, first_match, first_present, text_rule, FieldRule};

/// 名称缺失时使用的占位名，目录展示时会被过滤掉
pub const UNKNOWN_NAME: &str = "Inconnu";

/// 稀有度缺失或不是数字时的默认值
pub const DEFAULT_RARITY: i64 = 4;

const ID_RULES: &[FieldRule<String>] = &[
    text_rule("id"),
    text_rule("characterId"),
    text_rule("avatarId"),
    text_rule("avatar_id"),
    text_rule("AvatarId"),
];

const NAME_RULES: &[FieldRule<String>] = &[
    text_rule("name"),
    text_rule("Name"),
    text_rule("displayName"),
    text_rule("display_name"),
    text_rule("IdName"),
    text_rule("id_name"),
    text_rule("title"),
];

const ELEMENT_RULES: &[FieldRule<String>] = &[
    text_rule("element"),
    text_rule("elementId"),
    text_rule("Element"),
    text_rule("element_type"),
    text_rule("element_id"),
];

const PATH_RULES: &[FieldRule<String>] = &[
    text_rule("path"),
    text_rule("pathId"),
    text_rule("Path"),
    text_rule("path_id"),
    text_rule("role"),
];

const RARITY_FIELDS: &[&str] = &["rarity", "Rarity", "star", "stars"];

const PORTRAIT_RULES: &[FieldRule<String>] = &[
    text_rule("portrait"),
    text_rule("preview"),
    text_rule("icon"),
    text_rule("image"),
    text_rule("img"),
    text_rule("avatar"),
    text_rule("iconPath"),
];

const ENGLISH_NAME_RULES: &[FieldRule<String>] = &[
    text_rule("englishName"),
    text_rule("en"),
    text_rule("name_en"),
    text_rule("NameEN"),
    text_rule("i18n.en"),
    text_rule("i18n.EN"),
];

/// 规范化后的角色记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterRecord {
    /// 稳定标识；取不到时为 None，此时记录仍保留但不进入 id 索引
    pub id: Option<String>,
    /// 显示名称（昵称替换之后）
    pub name: String,
    /// 英文名（仅用于搜索与 slug）
    pub english_name: Option<String>,
    pub element_id: Option<String>,
    pub path_id: Option<String>,
    /// 原样保存的稀有度，显示时才截断
    pub rarity: i64,
    /// 立绘候选列表
    pub portrait_candidates: AssetCandidateList,
    /// URL 安全标识
    pub slug: String,
    /// 记录自带的技能 id 列表
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skill_ids: Vec<String>,
    /// 记录自带的星魂 id 列表
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rank_ids: Vec<String>,
    /// 记录自身携带的资源定位符（未改写）
    #[serde(skip)]
    pub explicit_portraits: Vec<String>,
}

impl CharacterRecord {
    /// 从任意形状的原始记录构建规范记录
    pub fn normalize(raw: &RawRecord) -> Self {
        let value = &raw.value;

        let id = first_match(value, ID_RULES).or_else(|| raw.key.clone());
        let name = first_match(value, NAME_RULES).unwrap_or_else(|| UNKNOWN_NAME.to_string());
        let english_name = first_match(value, ENGLISH_NAME_RULES);
        let slug = make_slug(english_name.as_deref().unwrap_or(&name));

        if id.is_none() {
            tracing::debug!(name = %name, "角色记录缺少 id，不会进入 id 索引");
        }

        CharacterRecord {
            id,
            name,
            english_name,
            element_id: first_match(value, ELEMENT_RULES),
            path_id: first_match(value, PATH_RULES),
            rarity: coerce_rarity(value),
            portrait_candidates: AssetCandidateList::default(),
            slug,
            skill_ids: id_list(value, "skills"),
            rank_ids: id_list(value, "ranks"),
            explicit_portraits: all_matches(value, PORTRAIT_RULES),
        }
    }

    /// 是否为缺名占位记录
    pub fn is_unnamed(&self) -> bool {
        self.name == UNKNOWN_NAME
    }

    pub fn id_str(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

/// 稀有度：第一个存在的别名值，小数四舍五入，非数字时使用默认值（超出范围的数字原样保留）
fn coerce_rarity(value: &Value) -> i64 {
    first_present(value, RARITY_FIELDS)
        .and_then(as_number)
        .map(|v| v.round() as i64)
        .unwrap_or(DEFAULT_RARITY)
}

fn id_list(value: &Value, field: &str) -> Vec<String> {
    value.get(field).map(as_text_list).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn normalize(value: Value) -> CharacterRecord {
        CharacterRecord::normalize(&RawRecord::new(None, value))
    }

    #[test]
    fn test_alias_equivalence() {
        let a = normalize(json!({"id": 1310, "name": "Luciole", "element": "Fire", "path": "Knight", "rarity": 5}));
        let b = normalize(json!({"avatar_id": "1310", "Name": "Luciole", "Element": "Fire", "Path": "Knight", "star": 5}));
        let c = normalize(json!({"AvatarId": 1310, "displayName": "Luciole", "element_type": "Fire", "role": "Knight", "stars": "5"}));

        for other in [&b, &c] {
            assert_eq!(a.id, other.id);
            assert_eq!(a.name, other.name);
            assert_eq!(a.element_id, other.element_id);
            assert_eq!(a.path_id, other.path_id);
            assert_eq!(a.rarity, other.rarity);
        }
        assert_eq!(a.id.as_deref(), Some("1310"));
    }

    #[test]
    fn test_rarity_default_when_absent_or_non_numeric() {
        assert_eq!(normalize(json!({"id": "1"})).rarity, DEFAULT_RARITY);
        assert_eq!(normalize(json!({"id": "1", "rarity": "legendary"})).rarity, DEFAULT_RARITY);
        assert_eq!(normalize(json!({"id": "1", "rarity": null, "star": 5})).rarity, 5);
    }

    #[test]
    fn test_fractional_rarity_is_rounded() {
        assert_eq!(normalize(json!({"id": "1", "rarity": 4.5})).rarity, 5);
        assert_eq!(normalize(json!({"id": "1", "rarity": "3,2"})).rarity, 3);
    }

    #[test]
    fn test_rarity_out_of_range_is_stored_as_given() {
        assert_eq!(normalize(json!({"id": "1", "rarity": 9})).rarity, 9);
        assert_eq!(normalize(json!({"id": "1", "rarity": -1})).rarity, -1);
        assert_eq!(crate::utils::rarity_stars(9), "★★★★★");
    }

    #[test]
    fn test_missing_id_is_kept() {
        let record = normalize(json!({"name": "Sans id"}));
        assert_eq!(record.id, None);
        assert_eq!(record.name, "Sans id");
    }

    #[test]
    fn test_payload_key_is_last_resort_id() {
        let record = CharacterRecord::normalize(&RawRecord::new(Some("1307".into()), json!({"name": "Black Swan"})));
        assert_eq!(record.id.as_deref(), Some("1307"));
    }

    #[test]
    fn test_defaults_and_slug() {
        let record = normalize(json!({"id": "1", "i18n": {"en": "Black Swan"}}));
        assert_eq!(record.name, UNKNOWN_NAME);
        assert!(record.is_unnamed());
        assert_eq!(record.english_name.as_deref(), Some("Black Swan"));
        assert_eq!(record.slug, "black_swan");
    }

    #[test]
    fn test_explicit_portraits_in_priority_order() {
        let record = normalize(json!({"id": "1", "icon": "icon/1.png", "portrait": "image/p/1.png"}));
        assert_eq!(record.explicit_portraits, vec!["image/p/1.png", "icon/1.png"]);
    }

    #[test]
    fn test_skill_and_rank_lists() {
        let record = normalize(json!({"id": "1310", "skills": [131001, "131002"], "ranks": ["131001"]}));
        assert_eq!(record.skill_ids, vec!["131001", "131002"]);
        assert_eq!(record.rank_ids, vec!["131001"]);
    }
}
