//! 提示文本模板引擎
//!
//! 处理顺序：参数展开 → HTML 转义 → 换行转 `<br>` → 关键词加粗 → 回合取整 → 数值高亮。
//! 关键词加粗必须在数值高亮之前执行。

mod markup;
mod params;

pub use markup::{emphasize_keywords, highlight_numbers};
pub use params::{expand_params, format_value};

use crate::datatypes::as_text;
use crate::lookup::LookupTable;
use crate::schema::ParamTable;
use crate::utils::escape_html;

/// 需要加粗的属性名集合（去重，按长度降序）
#[derive(Debug, Clone, Default)]
pub struct KeywordSet {
    names: Vec<String>,
    escaped: Vec<String>,
}

impl KeywordSet {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for name in names {
            let name = name.into().trim().to_string();
            if !name.is_empty() && !unique.contains(&name) {
                unique.push(name);
            }
        }
        unique.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()));

        let escaped = unique.iter().map(|name| escape_html(name)).collect();
        Self { names: unique, escaped }
    }

    /// 从 properties 文档构建（读取每个条目的 `name`）
    pub fn from_properties(properties: &LookupTable) -> Self {
        Self::new(properties.values().filter_map(|p| p.get("name").and_then(as_text)))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// 提示文本渲染器
#[derive(Debug, Clone, Default)]
pub struct TooltipEngine {
    keywords: KeywordSet,
}

impl TooltipEngine {
    pub fn new(keywords: KeywordSet) -> Self {
        Self { keywords }
    }

    pub fn keywords(&self) -> &KeywordSet {
        &self.keywords
    }

    /// 展开模板并生成标记文本
    pub fn render(&self, template: &str, params: &ParamTable, rank: usize) -> String {
        self.format(&expand_params(template, params, rank))
    }

    /// 对已展开的纯文本做转义与标记
    pub fn format(&self, text: &str) -> String {
        let escaped = escape_html(&text.replace("\r\n", "\n"));
        let html = escaped.replace('\n', "<br>");
        let html = emphasize_keywords(&html, &self.keywords.escaped);
        highlight_numbers(&html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn engine() -> TooltipEngine {
        let properties = LookupTable::from_value(&json!({
            "AttackAddedRatio": {"name": "ATQ"},
            "AttackDelta": {"name": "ATQ"},
            "BreakDamageAddedRatio": {"name": "Effet de Rupture"},
            "SpeedDelta": {"name": "VIT"}
        }));
        TooltipEngine::new(KeywordSet::from_properties(&properties))
    }

    #[test]
    fn test_keyword_set_dedup_and_order() {
        let set = engine().keywords().clone();
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["Effet de Rupture", "ATQ", "VIT"]);
    }

    #[test]
    fn test_render_percent() {
        let params = ParamTable::new(vec![vec![0.50, 0.56, 0.62, 0.68, 0.75]]);
        let plain = TooltipEngine::default();
        assert_eq!(plain.render("Deals #1[i]% DMG", &params, 2), r#"Deals <span class="hl">62</span>% DMG"#);
        assert_eq!(plain.render("Deals #1[i]% DMG", &params, 10), r#"Deals <span class="hl">75</span>% DMG"#);
    }

    #[test]
    fn test_full_pipeline() {
        let params = ParamTable::new(vec![vec![0.2], vec![2.0]]);
        let html = engine().render(
            "Augmente l'ATQ de #1[i]%.\nEffet de Rupture pendant #2[i] tour(s).",
            &params,
            0,
        );
        assert_eq!(
            html,
            concat!(
                r#"Augmente l&#039;<strong>ATQ</strong> de <span class="hl">20</span>%.<br>"#,
                r#"<strong>Effet de Rupture</strong> pendant <span class="hl">2</span> tour(s)."#
            )
        );
    }

    #[test]
    fn test_escapes_markup_in_source() {
        let html = TooltipEngine::default().format("<b>VIT</b>");
        assert_eq!(html, "&lt;b&gt;VIT&lt;/b&gt;");
    }

    #[test]
    fn test_substring_keyword_not_wrapped() {
        let html = engine().format("VITESSE et VIT");
        assert_eq!(html, "VITESSE et <strong>VIT</strong>");
    }
}
