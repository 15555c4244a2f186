use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::datatypes::{as_text, as_text_list, get_path, RawRecord};

use super::ability::ParamTable;
use super::rules::{first_match, integer_rule, text_rule, FieldRule};

const RELIC_ID_RULES: &[FieldRule<String>] = &[text_rule("id"), text_rule("set_id"), text_rule("eid")];
const CONE_ID_RULES: &[FieldRule<String>] = &[text_rule("id"), text_rule("eid")];
const NAME_RULES: &[FieldRule<String>] = &[text_rule("name"), text_rule("Name")];
const DESC_RULES: &[FieldRule<String>] = &[text_rule("desc"), text_rule("description")];
const ICON_RULES: &[FieldRule<String>] = &[text_rule("icon"), text_rule("iconPath")];

/// 遗器套装
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelicSet {
    pub id: Option<String>,
    pub name: String,
    /// 按件数排列的套装效果（2 件、4 件）
    pub piece_descriptions: Vec<String>,
    #[serde(skip)]
    pub icon: Option<String>,
}

impl RelicSet {
    pub fn normalize(raw: &RawRecord) -> Self {
        let value = &raw.value;
        RelicSet {
            id: first_match(value, RELIC_ID_RULES).or_else(|| raw.key.clone()),
            name: first_match(value, NAME_RULES).unwrap_or_default(),
            piece_descriptions: value.get("desc").map(as_text_list).unwrap_or_default(),
            icon: first_match(value, ICON_RULES),
        }
    }

    pub fn piece_description(&self, index: usize) -> &str {
        self.piece_descriptions.get(index).map(String::as_str).unwrap_or_default()
    }
}

/// 光锥
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightCone {
    pub id: Option<String>,
    pub name: String,
    /// 缺失时为 0，排序时排在最后
    pub rarity: i64,
    pub path_id: Option<String>,
    pub description: String,
    /// 叠影表中的键（`rank_id`），缺失时使用光锥 id
    pub rank_id: Option<String>,
    #[serde(skip)]
    pub eid: Option<String>,
    #[serde(skip)]
    pub icon: Option<String>,
}

impl LightCone {
    pub fn normalize(raw: &RawRecord) -> Self {
        let value = &raw.value;
        LightCone {
            id: first_match(value, CONE_ID_RULES).or_else(|| raw.key.clone()),
            name: first_match(value, NAME_RULES).unwrap_or_default(),
            rarity: first_match(value, &[integer_rule("rarity"), integer_rule("Rarity")]).unwrap_or(0),
            path_id: first_match(value, &[text_rule("path"), text_rule("pathId")]),
            description: first_match(value, DESC_RULES).unwrap_or_default(),
            rank_id: value.get("rank_id").and_then(as_text),
            eid: value.get("eid").and_then(as_text),
            icon: first_match(value, ICON_RULES),
        }
    }

    /// 叠影表的候选键：id、rank_id、eid
    pub fn rank_keys(&self) -> Vec<&str> {
        [self.id.as_deref(), self.rank_id.as_deref(), self.eid.as_deref()]
            .into_iter()
            .flatten()
            .collect()
    }
}

/// 光锥叠影效果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightConeRank {
    pub id: Option<String>,
    /// 被动技能名
    pub skill: Option<String>,
    pub description_template: String,
    pub param_table: ParamTable,
}

impl LightConeRank {
    pub fn normalize(raw: &RawRecord) -> Self {
        let value = &raw.value;
        LightConeRank {
            id: first_match(value, CONE_ID_RULES).or_else(|| raw.key.clone()),
            skill: value.get("skill").and_then(as_text),
            description_template: first_match(value, DESC_RULES).unwrap_or_default(),
            param_table: value.get("params").map(ParamTable::from_value).unwrap_or_default(),
        }
    }
}

/// 推荐遗器引用（id，可带标签）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelicRef {
    pub id: String,
    pub tag: Option<String>,
}

/// 推荐配队
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub name: String,
    pub members: Vec<String>,
    pub note: Option<String>,
}

/// 配队缺名时的默认名称
pub const DEFAULT_TEAM_NAME: &str = "Équipe";

/// 角色覆盖文档（人工维护的配装推荐）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterOverride {
    /// 行迹优先级（四个技能类别标签）
    pub traces_priority: Option<Vec<String>>,
    pub relics4: Vec<RelicRef>,
    pub planars2: Vec<String>,
    pub substats: Vec<String>,
    pub target_stats: Vec<(String, String)>,
    pub teams: Vec<Team>,
}

impl CharacterOverride {
    pub fn from_value(value: &Value) -> Self {
        let traces_priority = ["traces_priority", "traces.priority"]
            .iter()
            .find_map(|path| match get_path(value, path) {
                Some(list @ Value::Array(_)) => Some(as_text_list(list)),
                _ => None,
            })
            .filter(|list| !list.is_empty());

        let relics4 = array_at(value, "overview.relics4")
            .iter()
            .filter_map(|entry| match entry {
                Value::Object(_) => entry.get("id").and_then(as_text).map(|id| RelicRef {
                    id,
                    tag: first_match(entry, &[text_rule("tag"), text_rule("label")]),
                }),
                other => as_text(other).map(|id| RelicRef { id, tag: None }),
            })
            .collect();

        let target_stats = array_at(value, "target_stats")
            .iter()
            .filter_map(|pair| match pair {
                Value::Array(kv) if kv.len() >= 2 => Some((as_text(&kv[0])?, as_text(&kv[1])?)),
                _ => None,
            })
            .collect();

        let teams = array_at(value, "teams")
            .iter()
            .filter(|team| team.is_object())
            .map(|team| Team {
                name: team.get("name").and_then(as_text).unwrap_or_else(|| DEFAULT_TEAM_NAME.to_string()),
                members: team.get("members").map(as_text_list).unwrap_or_default(),
                note: team.get("note").and_then(as_text),
            })
            .collect();

        CharacterOverride {
            traces_priority,
            relics4,
            planars2: text_list_at(value, "overview.planars2"),
            substats: text_list_at(value, "substats"),
            target_stats,
            teams,
        }
    }
}

fn text_list_at(value: &Value, path: &str) -> Vec<String> {
    array_at(value, path).iter().filter_map(as_text).collect()
}

fn array_at<'a>(value: &'a Value, path: &str) -> &'a [Value] {
    match get_path(value, path) {
        Some(Value::Array(items)) => items.as_slice(),
        _ => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_relic_set() {
        let set = RelicSet::normalize(&RawRecord::new(None, json!({
            "set_id": 125, "name": "Forgeron du feu", "desc": ["2 pc", "4 pc"]
        })));
        assert_eq!(set.id.as_deref(), Some("125"));
        assert_eq!(set.piece_description(1), "4 pc");
        assert_eq!(set.piece_description(4), "");
    }

    #[test]
    fn test_light_cone() {
        let cone = LightCone::normalize(&RawRecord::new(Some("23025".into()), json!({
            "name": "Ailes d'un vol éphémère", "rarity": 5, "path": "Knight"
        })));
        assert_eq!(cone.id.as_deref(), Some("23025"));
        assert_eq!(cone.rarity, 5);
        assert_eq!(cone.rank_keys(), vec!["23025"]);
    }

    #[test]
    fn test_override_full() {
        let ovr = CharacterOverride::from_value(&json!({
            "traces": {"priority": ["Ultime", "Talent"]},
            "overview": {
                "relics4": [125, {"id": "126", "tag": "BiS"}, {"label": "sans id"}],
                "planars2": ["315"]
            },
            "substats": ["VIT", "Effet de rupture"],
            "target_stats": [["VIT", "150+"], ["bad"]],
            "teams": [{"members": ["Luciole", "Ruan Mei"]}]
        }));
        assert_eq!(ovr.traces_priority, Some(vec!["Ultime".to_string(), "Talent".to_string()]));
        assert_eq!(ovr.relics4, vec![
            RelicRef { id: "125".into(), tag: None },
            RelicRef { id: "126".into(), tag: Some("BiS".into()) },
        ]);
        assert_eq!(ovr.planars2, vec!["315"]);
        assert_eq!(ovr.target_stats, vec![("VIT".to_string(), "150+".to_string())]);
        assert_eq!(ovr.teams[0].name, DEFAULT_TEAM_NAME);
    }

    #[test]
    fn test_override_empty_document() {
        assert_eq!(CharacterOverride::from_value(&json!({})), CharacterOverride::default());
    }
}
