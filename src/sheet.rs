//! 角色详情页
//!
//! 由已解析的角色记录和详情文档（技能、星魂、行迹、光锥、遗器、覆盖文档）组装。
//! 各部分缺数据时为空列表，不会报错。

use std::collections::HashMap;

use serde::Serialize;

use crate::assets::{AssetCandidateList, AssetResolver};
use crate::config::CatalogConfig;
use crate::io::{
    override_key, DocumentSource, LoadedDocuments, ELEMENTS, LIGHT_CONES, LIGHT_CONE_RANKS, PATHS, PROPERTIES,
    RANKS, RELIC_SETS, SKILLS, SKILL_TREES,
};
use crate::labels::{LabelTranslator, PathLabel};
use crate::lookup::LookupTable;
use crate::schema::{
    normalize_optional, AbilityKind, AbilityRecord, CharacterOverride, CharacterRecord, LightCone, LightConeRank,
    RankRecord, RelicSet, Team, TraceNode,
};
use crate::tooltip::{KeywordSet, TooltipEngine};
use crate::utils::{escape_html, fold_text, rarity_stars, CatalogError};

/// 主要行迹的晋阶等级
const MAJOR_ASCENSIONS: [i64; 3] = [2, 4, 6];

/// 光锥叠影上限
const MAX_SUPERIMPOSITION: u8 = 5;

/// 规范化后的详情文档，每次加载构建一次
#[derive(Debug, Clone, Default)]
pub struct SheetData {
    abilities: Vec<AbilityRecord>,
    ranks: Vec<RankRecord>,
    traces: Vec<TraceNode>,
    light_cones: Vec<LightCone>,
    cone_ranks: HashMap<String, LightConeRank>,
    relic_sets: HashMap<String, RelicSet>,
    paths: LookupTable,
    labels: LabelTranslator,
    tooltip: TooltipEngine,
}

impl SheetData {
    pub fn from_documents(documents: &LoadedDocuments) -> Result<Self, CatalogError> {
        let elements = LookupTable::from_optional(documents.get(ELEMENTS));
        let paths = LookupTable::from_optional(documents.get(PATHS));
        let properties = LookupTable::from_optional(documents.get(PROPERTIES));

        let cone_ranks = normalize_optional(documents.get(LIGHT_CONE_RANKS), LightConeRank::normalize)
            .into_iter()
            .filter_map(|rank| rank.id.clone().map(|id| (id, rank)))
            .collect();
        let relic_sets = normalize_optional(documents.get(RELIC_SETS), RelicSet::normalize)
            .into_iter()
            .filter_map(|set| set.id.clone().map(|id| (id, set)))
            .collect();

        let data = SheetData {
            abilities: normalize_optional(documents.get(SKILLS), AbilityRecord::normalize),
            ranks: normalize_optional(documents.get(RANKS), RankRecord::normalize),
            traces: normalize_optional(documents.get(SKILL_TREES), TraceNode::normalize),
            light_cones: normalize_optional(documents.get(LIGHT_CONES), LightCone::normalize),
            cone_ranks,
            relic_sets,
            labels: LabelTranslator::new(&elements, &paths)?,
            paths,
            tooltip: TooltipEngine::new(KeywordSet::from_properties(&properties)),
        };

        tracing::debug!(
            abilities = data.abilities.len(),
            ranks = data.ranks.len(),
            traces = data.traces.len(),
            light_cones = data.light_cones.len(),
            relic_sets = data.relic_sets.len(),
            keywords = data.tooltip.keywords().len(),
            "详情文档已规范化"
        );
        Ok(data)
    }

    pub fn tooltip(&self) -> &TooltipEngine {
        &self.tooltip
    }
}

/// 读取角色覆盖文档；不存在或无法解析时返回 None
pub fn load_override<S>(source: &S, id: &str) -> Option<CharacterOverride>
where
    S: DocumentSource + ?Sized,
{
    let key = override_key(id);
    match source.fetch(&key) {
        Ok(value) => Some(CharacterOverride::from_value(&value)),
        Err(err) => {
            tracing::debug!(key = %key, error = %err, "没有可用的覆盖文档，使用默认值");
            None
        }
    }
}

/// 技能条目
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AbilityEntry {
    pub id: Option<String>,
    pub name: String,
    pub kind: AbilityKind,
    pub type_label: String,
    pub icon_candidates: AssetCandidateList,
    pub tooltip: String,
}

/// 星魂条目
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EidolonEntry {
    pub id: Option<String>,
    pub name: String,
    pub rank: Option<i64>,
    pub icon_candidates: AssetCandidateList,
    pub tooltip: String,
}

/// 主要行迹（A2/A4/A6）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceEntry {
    pub id: Option<String>,
    pub name: String,
    pub ascension: i64,
    pub icon_candidates: AssetCandidateList,
    pub tooltip: String,
}

/// 行迹优先级中的一项
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriorityEntry {
    /// 从 1 开始
    pub order: usize,
    pub label: String,
    pub icon_candidates: AssetCandidateList,
}

/// 推荐光锥
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConeEntry {
    pub id: Option<String>,
    pub name: String,
    pub rarity: i64,
    pub stars: String,
    pub path_label: String,
    pub icon_candidates: AssetCandidateList,
    pub tooltip: String,
}

/// 推荐遗器（4 件套）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelicEntry {
    /// 在覆盖文档中的位置，从 1 开始
    pub order: usize,
    pub id: String,
    pub name: String,
    pub tag: Option<String>,
    pub icon_candidates: AssetCandidateList,
    pub tooltip: String,
}

/// 推荐位面饰品（2 件套）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanarEntry {
    pub id: String,
    pub name: String,
    pub icon_candidates: AssetCandidateList,
    pub tooltip: String,
}

/// 覆盖文档给出的配装推荐
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Equipment {
    pub relics: Vec<RelicEntry>,
    pub planars: Vec<PlanarEntry>,
    pub substats: Vec<String>,
    pub target_stats: Vec<(String, String)>,
    pub teams: Vec<Team>,
}

impl Equipment {
    pub fn is_empty(&self) -> bool {
        self.relics.is_empty()
            && self.planars.is_empty()
            && self.substats.is_empty()
            && self.target_stats.is_empty()
            && self.teams.is_empty()
    }
}

/// 角色详情
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CharacterSheet {
    pub character: CharacterRecord,
    pub element_label: Option<String>,
    pub element_icon: AssetCandidateList,
    pub path_label: Option<PathLabel>,
    pub path_icon: AssetCandidateList,
    pub abilities: Vec<AbilityEntry>,
    pub eidolons: Vec<EidolonEntry>,
    pub major_traces: Vec<TraceEntry>,
    pub trace_priority: Vec<PriorityEntry>,
    pub superimposition: u8,
    pub light_cones: Vec<ConeEntry>,
    pub equipment: Option<Equipment>,
}

/// 详情页构建器
#[derive(Debug, Clone, Copy)]
pub struct SheetBuilder<'a> {
    data: &'a SheetData,
    config: &'a CatalogConfig,
    resolver: &'a AssetResolver,
}

impl<'a> SheetBuilder<'a> {
    pub fn new(data: &'a SheetData, config: &'a CatalogConfig, resolver: &'a AssetResolver) -> Self {
        Self { data, config, resolver }
    }

    /// 构建角色详情；叠影等级截断到 1..=5
    pub fn build(
        &self,
        character: &CharacterRecord,
        overrides: Option<&CharacterOverride>,
        superimposition: u8,
    ) -> CharacterSheet {
        let owner = character.id_str().unwrap_or_default();
        let superimposition = superimposition.clamp(1, MAX_SUPERIMPOSITION);

        let owned_abilities = self.owned_abilities(character);
        let sheet = CharacterSheet {
            element_label: character.element_id.as_deref().map(|id| self.data.labels.element_label(id)),
            element_icon: character
                .element_id
                .as_deref()
                .map(|id| self.resolver.element_icon(id))
                .unwrap_or_default(),
            path_label: character.path_id.as_deref().map(|id| self.data.labels.path_label(id)),
            path_icon: character
                .path_id
                .as_deref()
                .map(|id| self.resolver.path_icon(self.data.paths.get(id), id))
                .unwrap_or_default(),
            abilities: self.abilities(owner, &owned_abilities),
            eidolons: self.eidolons(character),
            major_traces: self.major_traces(owner),
            trace_priority: self.trace_priority(owner, &owned_abilities, overrides),
            superimposition,
            light_cones: self.light_cones(character, superimposition),
            equipment: overrides.map(|o| self.equipment(o)).filter(|e| !e.is_empty()),
            character: character.clone(),
        };

        tracing::debug!(
            id = owner,
            abilities = sheet.abilities.len(),
            eidolons = sheet.eidolons.len(),
            traces = sheet.major_traces.len(),
            cones = sheet.light_cones.len(),
            "角色详情构建完成"
        );
        sheet
    }

    /// 归属角色的技能：先按 owner id，找不到时用记录自带的技能 id 列表
    fn owned_abilities(&self, character: &CharacterRecord) -> Vec<&'a AbilityRecord> {
        let abilities = &self.data.abilities;
        let by_owner: Vec<&AbilityRecord> = match character.id_str() {
            Some(id) => abilities.iter().filter(|a| a.owner_id.as_deref() == Some(id)).collect(),
            None => Vec::new(),
        };
        if !by_owner.is_empty() {
            return by_owner;
        }
        character
            .skill_ids
            .iter()
            .filter_map(|id| abilities.iter().find(|a| a.id.as_deref() == Some(id.as_str())))
            .collect()
    }

    /// 核心技能：按类别排序，每类只保留第一个，忽略秘技普攻
    fn abilities(&self, owner: &str, owned: &[&AbilityRecord]) -> Vec<AbilityEntry> {
        let mut sorted: Vec<&AbilityRecord> = owned.to_vec();
        sorted.sort_by_key(|a| a.kind.order());

        let mut seen: Vec<&AbilityKind> = Vec::new();
        let mut entries = Vec::new();
        for ability in sorted {
            if ability.kind == AbilityKind::MazeNormal || seen.contains(&&ability.kind) {
                continue;
            }
            seen.push(&ability.kind);
            entries.push(AbilityEntry {
                id: ability.id.clone(),
                name: ability.name.clone(),
                kind: ability.kind.clone(),
                type_label: ability.type_label().to_string(),
                icon_candidates: self.resolver.skill_icon(owner, ability),
                tooltip: self.data.tooltip.render(&ability.description_template, &ability.param_table, 0),
            });
        }
        entries
    }

    /// 星魂：按序号排序
    fn eidolons(&self, character: &CharacterRecord) -> Vec<EidolonEntry> {
        let ranks = &self.data.ranks;
        let owner = character.id_str().unwrap_or_default();
        let mut owned: Vec<&RankRecord> = if owner.is_empty() {
            Vec::new()
        } else {
            ranks.iter().filter(|r| r.owner_id.as_deref() == Some(owner)).collect()
        };
        if owned.is_empty() {
            owned = character
                .rank_ids
                .iter()
                .filter_map(|id| ranks.iter().find(|r| r.id.as_deref() == Some(id.as_str())))
                .collect();
        }
        owned.sort_by_key(|r| r.rank.unwrap_or(0));

        owned
            .into_iter()
            .map(|rank| EidolonEntry {
                id: rank.id.clone(),
                name: rank.name.clone(),
                rank: rank.rank,
                icon_candidates: self.resolver.rank_icon(owner, rank),
                tooltip: self.data.tooltip.render(&rank.description_template, &rank.param_table, 0),
            })
            .collect()
    }

    /// 主要行迹：每个晋阶等级取第一个合格节点，按 A2、A4、A6 排列
    fn major_traces(&self, owner: &str) -> Vec<TraceEntry> {
        if owner.is_empty() {
            return Vec::new();
        }

        let candidates: Vec<(&TraceNode, i64)> = self
            .data
            .traces
            .iter()
            .filter(|node| {
                node.owner_id.as_deref() == Some(owner) || node.id.as_deref().is_some_and(|id| id.starts_with(owner))
            })
            .filter(|node| !node.name.trim().is_empty() && !node.is_minor())
            .filter_map(|node| node.major_ascension().map(|ascension| (node, ascension)))
            .collect();

        MAJOR_ASCENSIONS
            .iter()
            .filter_map(|&ascension| candidates.iter().find(|(_, a)| *a == ascension))
            .enumerate()
            .map(|(index, &(node, ascension))| TraceEntry {
                id: node.id.clone(),
                name: node.name.clone(),
                ascension,
                icon_candidates: self.resolver.trace_icon(owner, node, index + 1),
                tooltip: self.data.tooltip.render(&node.description_template, &node.param_table, 0),
            })
            .collect()
    }

    /// 行迹优先级：覆盖文档或默认顺序，每个标签附上对应技能的图标
    fn trace_priority(
        &self,
        owner: &str,
        owned: &[&AbilityRecord],
        overrides: Option<&CharacterOverride>,
    ) -> Vec<PriorityEntry> {
        let labels = overrides
            .and_then(|o| o.traces_priority.as_ref())
            .unwrap_or(&self.config.default_trace_priority);

        labels
            .iter()
            .enumerate()
            .map(|(index, label)| {
                let kinds = priority_kinds(label);
                let icon_candidates = owned
                    .iter()
                    .find(|a| kinds.contains(&a.kind))
                    .map(|ability| self.resolver.skill_icon(owner, ability))
                    .unwrap_or_default();
                PriorityEntry {
                    order: index + 1,
                    label: label.clone(),
                    icon_candidates,
                }
            })
            .collect()
    }

    /// 同命途光锥：稀有度降序，取前 N 个
    fn light_cones(&self, character: &CharacterRecord, superimposition: u8) -> Vec<ConeEntry> {
        let Some(path) = character.path_id.as_deref().map(fold_text) else {
            return Vec::new();
        };

        let mut cones: Vec<&LightCone> = self
            .data
            .light_cones
            .iter()
            .filter(|cone| cone.path_id.as_deref().map(fold_text).as_deref() == Some(path.as_str()))
            .collect();
        cones.sort_by(|a, b| b.rarity.cmp(&a.rarity));

        cones
            .into_iter()
            .take(self.config.light_cone_limit)
            .map(|cone| ConeEntry {
                id: cone.id.clone(),
                name: cone.name.clone(),
                rarity: cone.rarity,
                stars: rarity_stars(cone.rarity),
                path_label: cone
                    .path_id
                    .as_deref()
                    .map(|p| self.data.labels.path_label(p).display)
                    .unwrap_or_default(),
                icon_candidates: self.resolver.cone_icon(cone),
                tooltip: self.cone_tooltip(cone, superimposition),
            })
            .collect()
    }

    /// 光锥提示：优先叠影表（被动名加粗作标题），否则用光锥描述
    fn cone_tooltip(&self, cone: &LightCone, superimposition: u8) -> String {
        let rank = cone.rank_keys().into_iter().find_map(|key| self.data.cone_ranks.get(key));
        match rank {
            Some(rank) => {
                let index = usize::from(superimposition.saturating_sub(1));
                let head = rank
                    .skill
                    .as_deref()
                    .map(|skill| format!("<strong>{}</strong><br>", escape_html(skill)))
                    .unwrap_or_default();
                head + &self.data.tooltip.render(&rank.description_template, &rank.param_table, index)
            }
            None => self.data.tooltip.format(&cone.description),
        }
    }

    /// 覆盖文档中的配装；引用不到的遗器被跳过，但保留原始序号
    fn equipment(&self, overrides: &CharacterOverride) -> Equipment {
        let relic_sets = &self.data.relic_sets;

        let relics = overrides
            .relics4
            .iter()
            .enumerate()
            .filter_map(|(index, relic)| {
                let set = relic_sets.get(&relic.id)?;
                let text = format!(
                    "2 pièces : {}\n4 pièces : {}",
                    set.piece_description(0),
                    set.piece_description(1)
                );
                Some(RelicEntry {
                    order: index + 1,
                    id: relic.id.clone(),
                    name: set.name.clone(),
                    tag: relic.tag.clone(),
                    icon_candidates: self.resolver.relic_icon(set),
                    tooltip: self.data.tooltip.format(&text),
                })
            })
            .collect();

        let planars = overrides
            .planars2
            .iter()
            .filter_map(|id| {
                let set = relic_sets.get(id)?;
                Some(PlanarEntry {
                    id: id.clone(),
                    name: set.name.clone(),
                    icon_candidates: self.resolver.relic_icon(set),
                    tooltip: self.data.tooltip.format(set.piece_description(0)),
                })
            })
            .collect();

        Equipment {
            relics,
            planars,
            substats: overrides.substats.clone(),
            target_stats: overrides.target_stats.clone(),
            teams: overrides.teams.clone(),
        }
    }
}

/// 行迹优先级标签对应的技能类别
fn priority_kinds(label: &str) -> &'static [AbilityKind] {
    match fold_text(label).as_str() {
        "atq normale" | "attaque normale" | "basic atk" => &[AbilityKind::Basic],
        "competence" | "skill" => &[AbilityKind::Skill],
        "ultime" | "ultimate" => &[AbilityKind::Ultimate],
        "talent" => &[AbilityKind::Talent],
        "technique" => &[AbilityKind::Technique],
        _ => &[],
    }
}
