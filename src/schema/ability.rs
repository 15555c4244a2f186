use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::assets::AssetCandidateList;
use crate::datatypes::{as_integer, as_number, as_text, RawRecord};

use super::rules::{first_match, integer_rule, text_rule, FieldRule};

const ID_RULES: &[FieldRule<String>] = &[text_rule("id"), text_rule("skill_id"), text_rule("eid")];
const OWNER_RULES: &[FieldRule<String>] = &[text_rule("character_id"), text_rule("avatar_id")];
const NAME_RULES: &[FieldRule<String>] = &[text_rule("name"), text_rule("Name")];
const DESC_RULES: &[FieldRule<String>] = &[text_rule("desc"), text_rule("description"), text_rule("Desc")];
const ICON_RULES: &[FieldRule<String>] = &[text_rule("icon"), text_rule("iconPath")];
const RANK_RULES: &[FieldRule<i64>] = &[integer_rule("rank"), integer_rule("Rank")];

/// 参数表：参数下标 → 各升级档位的数值序列
///
/// 接受数组的数组（`[[0.5, 0.56], [2]]`）或以下标为键的对象（`{"0": [0.5, 0.56]}`）。
/// 按下标稀疏存储，对象形式中的大下标不会按下标分配空间。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParamTable {
    columns: BTreeMap<usize, Vec<f64>>,
}

impl ParamTable {
    pub fn new(columns: Vec<Vec<f64>>) -> Self {
        Self {
            columns: columns.into_iter().enumerate().collect(),
        }
    }

    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Array(items) => Self::new(items.iter().map(number_sequence).collect()),
            Value::Object(map) => Self {
                columns: map
                    .iter()
                    .filter_map(|(key, v)| key.trim().parse::<usize>().ok().map(|i| (i, number_sequence(v))))
                    .collect(),
            },
            _ => Self::default(),
        }
    }

    /// 取参数 `index` 在档位 `rank` 的值，档位越界时截断到已定义的最后一档
    pub fn value(&self, index: usize, rank: usize) -> Option<f64> {
        let values = self.columns.get(&index)?;
        let last = values.len().checked_sub(1)?;
        values.get(rank.min(last)).copied()
    }

    /// 参数槽位数（最大下标 + 1）
    pub fn len(&self) -> usize {
        self.columns
            .keys()
            .next_back()
            .map_or(0, |last| last.saturating_add(1))
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// 单个参数的数值序列；标量视为只有一档
fn number_sequence(value: &Value) -> Vec<f64> {
    match value {
        Value::Array(items) => items.iter().filter_map(as_number).collect(),
        other => as_number(other).into_iter().collect(),
    }
}

/// 技能类型
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AbilityKind {
    Basic,
    Skill,
    Ultimate,
    Talent,
    Technique,
    /// 秘技普攻，角色页不展示
    MazeNormal,
    Other(String),
}

impl AbilityKind {
    /// 从数据中的类型字符串识别
    pub fn from_type(type_name: &str) -> Self {
        match type_name.trim() {
            "Normal" | "BasicATK" => AbilityKind::Basic,
            "BPSkill" | "Skill" => AbilityKind::Skill,
            "Ultra" | "Ultimate" => AbilityKind::Ultimate,
            "Talent" => AbilityKind::Talent,
            "Maze" | "Technique" => AbilityKind::Technique,
            "MazeNormal" => AbilityKind::MazeNormal,
            other => AbilityKind::Other(other.to_string()),
        }
    }

    /// 展示排序权重
    pub fn order(&self) -> u8 {
        match self {
            AbilityKind::Basic => 1,
            AbilityKind::Skill => 2,
            AbilityKind::Ultimate => 3,
            AbilityKind::Talent => 4,
            AbilityKind::Technique => 5,
            AbilityKind::MazeNormal | AbilityKind::Other(_) => 99,
        }
    }

    /// 技能图标文件名后缀
    pub fn icon_suffix(&self) -> Option<&'static str> {
        match self {
            AbilityKind::Basic => Some("basic_atk"),
            AbilityKind::Skill => Some("skill"),
            AbilityKind::Ultimate => Some("ultimate"),
            AbilityKind::Talent => Some("talent"),
            AbilityKind::Technique => Some("technique"),
            AbilityKind::MazeNormal | AbilityKind::Other(_) => None,
        }
    }
}

/// 技能记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbilityRecord {
    pub id: Option<String>,
    /// 所属角色 id
    pub owner_id: Option<String>,
    pub name: String,
    pub kind: AbilityKind,
    /// 原始类型字符串
    pub type_name: String,
    /// 类型的本地化文本（`type_text`）
    pub type_text: Option<String>,
    pub description_template: String,
    pub param_table: ParamTable,
    /// 记录自带的图标定位符（未改写）
    #[serde(skip)]
    pub icon: Option<String>,
    pub icon_candidates: AssetCandidateList,
}

impl AbilityRecord {
    pub fn normalize(raw: &RawRecord) -> Self {
        let value = &raw.value;
        let type_name = value.get("type").and_then(as_text).unwrap_or_default();

        AbilityRecord {
            id: first_match(value, ID_RULES).or_else(|| raw.key.clone()),
            owner_id: first_match(value, OWNER_RULES),
            name: first_match(value, NAME_RULES).unwrap_or_default(),
            kind: AbilityKind::from_type(&type_name),
            type_name,
            type_text: value.get("type_text").and_then(as_text),
            description_template: first_match(value, DESC_RULES).unwrap_or_default(),
            param_table: value.get("params").map(ParamTable::from_value).unwrap_or_default(),
            icon: first_match(value, ICON_RULES),
            icon_candidates: AssetCandidateList::default(),
        }
    }

    /// 类型显示文本：优先本地化文本
    pub fn type_label(&self) -> &str {
        self.type_text.as_deref().unwrap_or(&self.type_name)
    }
}

/// 星魂记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankRecord {
    pub id: Option<String>,
    pub owner_id: Option<String>,
    pub name: String,
    /// 星魂序号（1..6），缺失时为 None
    pub rank: Option<i64>,
    pub description_template: String,
    pub param_table: ParamTable,
    #[serde(skip)]
    pub icon: Option<String>,
    pub icon_candidates: AssetCandidateList,
}

impl RankRecord {
    pub fn normalize(raw: &RawRecord) -> Self {
        let value = &raw.value;
        RankRecord {
            id: first_match(value, ID_RULES).or_else(|| raw.key.clone()),
            owner_id: first_match(value, OWNER_RULES),
            name: first_match(value, NAME_RULES).unwrap_or_default(),
            rank: first_match(value, RANK_RULES),
            description_template: first_match(value, DESC_RULES).unwrap_or_default(),
            param_table: value.get("params").map(ParamTable::from_value).unwrap_or_default(),
            icon: first_match(value, ICON_RULES),
            icon_candidates: AssetCandidateList::default(),
        }
    }
}

/// 行迹树节点
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceNode {
    pub id: Option<String>,
    pub owner_id: Option<String>,
    pub name: String,
    pub description_template: String,
    pub param_table: ParamTable,
    /// `levels[].promotion` 中出现的晋阶等级
    pub promotions: Vec<i64>,
    #[serde(skip)]
    pub icon: Option<String>,
    pub icon_candidates: AssetCandidateList,
}

impl TraceNode {
    pub fn normalize(raw: &RawRecord) -> Self {
        let value = &raw.value;
        let promotions = match value.get("levels") {
            Some(Value::Array(levels)) => levels
                .iter()
                .filter_map(|level| level.get("promotion").and_then(as_integer))
                .collect(),
            _ => Vec::new(),
        };

        TraceNode {
            id: first_match(value, ID_RULES).or_else(|| raw.key.clone()),
            owner_id: first_match(value, OWNER_RULES),
            name: first_match(value, NAME_RULES).unwrap_or_default(),
            description_template: first_match(value, DESC_RULES).unwrap_or_default(),
            param_table: value.get("params").map(ParamTable::from_value).unwrap_or_default(),
            promotions,
            icon: first_match(value, ICON_RULES),
            icon_candidates: AssetCandidateList::default(),
        }
    }

    /// 第一个 A2/A4/A6 晋阶等级
    pub fn major_ascension(&self) -> Option<i64> {
        self.promotions.iter().copied().find(|p| matches!(p, 2 | 4 | 6))
    }

    /// 小属性节点（攻击力提升之类），不属于主要行迹
    pub fn is_minor(&self) -> bool {
        let icon = self.icon.as_deref().unwrap_or_default().to_lowercase();
        let base = icon.rsplit('/').next().unwrap_or_default();
        if base.starts_with("icon") {
            return true;
        }
        if icon.contains("property") || icon.contains("stat") {
            return true;
        }
        self.name.trim().to_lowercase().starts_with("augmentation")
    }
}
