//! 基本使用示例
//!
//! 这个示例展示了如何使用 hsr_catalog 库的基本功能：
//! 1. 从内存文档构建角色目录
//! 2. 筛选与排序
//! 3. 渲染技能描述模板

use hsr_catalog::io::{load_documents, DocumentSpec, CHARACTERS, ELEMENTS, PATHS};
use hsr_catalog::schema::ParamTable;
use hsr_catalog::{
    rarity_stars, AssetResolver, Catalog, CatalogConfig, CatalogQuery, CatalogSources, DataRoot, KeywordSet,
    MemorySource, SortKey, TooltipEngine, VERSION,
};
use serde_json::json;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("角色目录解析 v{}", VERSION);

    let source = MemorySource::new()
        .with(
            CHARACTERS,
            json!([
                {"id": "1310", "name": "Luciole", "element": "Fire", "path": "Knight", "rarity": 5},
                {"avatar_id": "1307", "Name": "Cygne Noir", "Element": "Wind", "Path": "Warlock", "star": 5},
                {"id": "8002", "name": "{NICKNAME}", "element": "Physical", "path": "Warrior", "rarity": 5},
                {"id": "1001", "name": "March 7th", "element": "Ice", "path": "Knight", "rarity": 4}
            ]),
        )
        .with(ELEMENTS, json!({}))
        .with(PATHS, json!({"Knight": {"name": "La Préservation"}, "Warlock": {"name": "La Nihilité"}}));

    let documents = load_documents(&source, &DocumentSpec::catalog_set())?;
    let config = CatalogConfig::default();
    let resolver = AssetResolver::new(DataRoot::new(config.asset_root.as_str()));
    let catalog = Catalog::build(CatalogSources::from_documents(&documents)?, &config, &resolver)?;

    println!("\n=== 目录 ({} 个角色) ===", catalog.len());
    let query = CatalogQuery { sort: SortKey::Rarity, ..Default::default() };
    for record in catalog.query(&query) {
        println!(
            "{:<12} {} {:<18} {}",
            record.name,
            rarity_stars(record.rarity),
            catalog.path_label(record).map(|p| p.display).unwrap_or_default(),
            record.portrait_candidates.first().unwrap_or("-")
        );
    }

    println!("\n=== 命途筛选 ===");
    for chip in catalog.path_chips() {
        println!("{} -> {}", chip.id, chip.label);
    }

    println!("\n=== 描述模板 ===");
    let engine = TooltipEngine::new(KeywordSet::new(["ATQ", "VIT"]));
    let params = ParamTable::new(vec![vec![0.50, 0.56, 0.62, 0.68, 0.75], vec![2.0]]);
    for rank in 0..3 {
        println!("{}", engine.render("Augmente l'ATQ de #1[i]% pendant #2[i] tour(s).", &params, rank));
    }

    Ok(())
}
