use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tempfile::TempDir;

use hsr_catalog::io::{load_documents, resolve_index_dir, DocumentSpec};
use hsr_catalog::{
    AssetLoad, AssetResolver, AssetState, CachedSource, Catalog, CatalogConfig, CatalogError, CatalogQuery,
    CatalogSources, DataRoot, DirectorySource, SortKey,
};

fn write_json(dir: &Path, name: &str, value: &Value) {
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join(name), serde_json::to_string_pretty(value).unwrap()).unwrap();
}

/// 在 `data/index_min/fr/` 下写入一套最小的目录数据
fn site() -> TempDir {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("data/index_min/fr");
    write_json(
        &dir,
        "characters.json",
        &json!({
            "characters": [
                {"id": "1310", "name": "Luciole", "element": "Fire", "path": "Knight", "rarity": 5},
                {"avatar_id": 1307, "Name": "Cygne Noir", "Element": "Wind", "Path": "Warlock", "star": "5"},
                {"AvatarId": "1001", "displayName": "March 7th", "element_type": "Ice", "role": "Knight", "stars": 4}
            ]
        }),
    );
    write_json(
        &dir,
        "elements.json",
        &json!([
            {"id": "Fire", "name": "Feu"},
            {"id": "Ice", "name": "Glace"},
            {"id": "Wind", "name": "Vent"}
        ]),
    );
    write_json(
        &dir,
        "paths.json",
        &json!({
            "Knight": {"name": "La Préservation", "icon": "icon/path/Knight.png"},
            "Warlock": {"name": "La Nihilité"}
        }),
    );
    write_json(&dir, "avatars.json", &json!({"1001": {"icon": "March7th.png"}}));
    temp
}

fn build_catalog(root: &Path) -> Catalog {
    let config = CatalogConfig::default();
    let dir = resolve_index_dir(root, &config.data_prefixes);
    let source = CachedSource::new(DirectorySource::new(dir));
    let documents = load_documents(&source, &DocumentSpec::catalog_set()).unwrap();
    let resolver = AssetResolver::new(DataRoot::new(config.asset_root.as_str()));
    Catalog::build(CatalogSources::from_documents(&documents).unwrap(), &config, &resolver).unwrap()
}

#[test]
fn test_mixed_aliases_share_canonical_shape() {
    let temp = site();
    let catalog = build_catalog(temp.path());
    assert_eq!(catalog.len(), 3);

    let shapes: Vec<Vec<String>> = catalog
        .records()
        .iter()
        .map(|record| {
            let value = serde_json::to_value(record).unwrap();
            let mut keys: Vec<String> = value.as_object().unwrap().keys().cloned().collect();
            keys.sort();
            keys
        })
        .collect();
    assert_eq!(shapes[0], shapes[1]);
    assert_eq!(shapes[1], shapes[2]);

    let swan = catalog.get("1307").unwrap();
    assert_eq!(swan.element_id.as_deref(), Some("Wind"));
    assert_eq!(swan.path_id.as_deref(), Some("Warlock"));
    assert_eq!(swan.rarity, 5);

    let march = catalog.get("1001").unwrap();
    assert_eq!(march.name, "March 7th");
    assert_eq!(march.path_id.as_deref(), Some("Knight"));
    assert_eq!(march.rarity, 4);
}

#[test]
fn test_portrait_candidates_from_avatar_table() {
    let temp = site();
    let catalog = build_catalog(temp.path());
    let march = catalog.get("1001").unwrap();
    assert_eq!(
        march.portrait_candidates.iter().collect::<Vec<_>>(),
        vec![
            "/data/image/character_portrait/March7th.png",
            "/data/image/character_portrait/1001.png"
        ]
    );
}

#[test]
fn test_labels_and_query() {
    let temp = site();
    let catalog = build_catalog(temp.path());

    let luciole = catalog.get("1310").unwrap();
    assert_eq!(catalog.element_label(luciole).as_deref(), Some("Feu"));
    assert_eq!(catalog.path_label(luciole).unwrap().display, "La Préservation");

    let knights = catalog.query(&CatalogQuery {
        path: Some("preservation".into()),
        sort: SortKey::Rarity,
        ..Default::default()
    });
    let names: Vec<&str> = knights.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Luciole", "March 7th"]);
}

#[test]
fn test_missing_required_document() {
    let temp = TempDir::new().unwrap();
    write_json(temp.path(), "characters.json", &json!([]));
    let source = DirectorySource::new(temp.path());

    let err = load_documents(&source, &DocumentSpec::catalog_set()).unwrap_err();
    match err {
        CatalogError::RequiredDocument { key, .. } => assert!(key == "elements.json" || key == "paths.json"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_asset_retry_settles_on_third_candidate() {
    let resolver = AssetResolver::default();
    let list = resolver.build(hsr_catalog::AssetKind::Portrait, ["a.png", "b.png", "c.png"]);
    let mut load = AssetLoad::start(list);

    assert_eq!(load.current(), Some("/data/image/character_portrait/a.png"));
    assert_eq!(load.report_failure(), Some("/data/image/character_portrait/b.png"));
    assert_eq!(load.report_failure(), Some("/data/image/character_portrait/c.png"));
    load.report_success();
    assert!(load.is_loaded());
    assert_eq!(load.current(), Some("/data/image/character_portrait/c.png"));
}

#[test]
fn test_asset_retry_exhausted() {
    let resolver = AssetResolver::default();
    let mut load = AssetLoad::start(resolver.build(hsr_catalog::AssetKind::RelicIcon, ["a.png", "b.png"]));

    load.report_failure();
    assert_eq!(load.report_failure(), None);
    assert!(load.is_exhausted());
    assert_eq!(load.state(), &AssetState::Exhausted { attempted: 2 });

    let empty = AssetLoad::start(resolver.build(hsr_catalog::AssetKind::RelicIcon, Vec::<String>::new()));
    assert_eq!(empty.state(), &AssetState::Exhausted { attempted: 0 });
}
