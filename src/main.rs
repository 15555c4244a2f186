use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use hsr_catalog::io::{load_documents, resolve_index_dir, DocumentSpec};
use hsr_catalog::sheet::load_override;
use hsr_catalog::{
    AssetResolver, CachedSource, Catalog, CatalogConfig, CatalogError, CatalogQuery, CatalogSources,
    DataRoot, DirectorySource, SheetBuilder, SheetData, SortKey,
};

#[derive(Parser)]
#[command(name = "hsr_catalog")]
#[command(about = "角色目录与角色详情的数据解析工具")]
#[command(version)]
struct Cli {
    /// 站点根目录（在其下按配置的前缀探测数据目录）
    #[arg(short, long, default_value = ".")]
    root: PathBuf,

    /// 直接指定数据目录（跳过探测）
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// 配置文件路径（JSON）
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 输出文件路径（默认标准输出）
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// 静默模式(仅输出错误)
    #[arg(long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// 输出筛选、排序后的角色目录
    List {
        /// 名称子串
        #[arg(long)]
        name: Option<String>,

        /// 元素 id
        #[arg(long)]
        element: Option<String>,

        /// 命途 id 或命途名称
        #[arg(long)]
        path: Option<String>,

        /// 稀有度
        #[arg(long)]
        rarity: Option<i64>,

        /// 排序方式: name / rarity / element / path
        #[arg(long, default_value = "name")]
        sort: SortKey,
    },

    /// 输出单个角色的详情
    Show {
        /// 角色 id、slug 或名称
        key: String,

        /// 光锥叠影等级 (1-5)
        #[arg(short, long, default_value_t = 1)]
        superimposition: u8,
    },

    /// 扫描角色页目录并生成 slug 索引
    Index {
        /// 角色页所在目录（每个角色一个子目录）
        dir: PathBuf,
    },
}

/// slug 索引条目
#[derive(Debug, Serialize)]
struct IndexEntry {
    slug: String,
    name: String,
    image: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.quiet);

    let config = match &cli.config {
        Some(path) => CatalogConfig::from_json_file(path)
            .with_context(|| format!("无法读取配置文件: {}", path.display()))?,
        None => CatalogConfig::default(),
    };

    match &cli.command {
        Command::List { name, element, path, rarity, sort } => {
            let query = CatalogQuery {
                name: name.clone(),
                element: element.clone(),
                path: path.clone(),
                rarity: *rarity,
                sort: *sort,
            };
            handle_list(&cli, &config, &query)
        }
        Command::Show { key, superimposition } => handle_show(&cli, &config, key, *superimposition),
        Command::Index { dir } => handle_index(&cli, dir),
    }
}

fn init_tracing(quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn data_source(cli: &Cli, config: &CatalogConfig) -> CachedSource<DirectorySource> {
    let dir = match &cli.data {
        Some(dir) => dir.clone(),
        None => resolve_index_dir(&cli.root, &config.data_prefixes),
    };
    tracing::info!(dir = %dir.display(), "使用数据目录");
    CachedSource::new(DirectorySource::new(dir))
}

fn handle_list(cli: &Cli, config: &CatalogConfig, query: &CatalogQuery) -> Result<()> {
    let source = data_source(cli, config);
    let documents = load_documents(&source, &DocumentSpec::catalog_set())?;
    let resolver = AssetResolver::new(DataRoot::new(config.asset_root.as_str()));
    let catalog = Catalog::build(CatalogSources::from_documents(&documents)?, config, &resolver)?;

    let records = catalog.query(query);
    tracing::info!(matched = records.len(), total = catalog.len(), "目录查询完成");
    write_json(cli.output.as_deref(), &records)
}

fn handle_show(cli: &Cli, config: &CatalogConfig, key: &str, superimposition: u8) -> Result<()> {
    let source = data_source(cli, config);
    let documents = load_documents(&source, &DocumentSpec::sheet_set())?;
    let resolver = AssetResolver::new(DataRoot::new(config.asset_root.as_str()));
    let catalog = Catalog::build(CatalogSources::from_documents(&documents)?, config, &resolver)?;

    let character = catalog
        .find(key)
        .ok_or_else(|| CatalogError::CharacterNotFound(key.to_string()))?;
    let overrides = character.id_str().and_then(|id| load_override(&source, id));

    let data = SheetData::from_documents(&documents)?;
    let sheet = SheetBuilder::new(&data, config, &resolver).build(character, overrides.as_ref(), superimposition);
    write_json(cli.output.as_deref(), &sheet)
}

fn handle_index(cli: &Cli, dir: &Path) -> Result<()> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("无法读取目录: {}", dir.display()))? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let slug = entry.file_name().to_string_lossy().into_owned();
        entries.push(IndexEntry {
            image: format!("assets/{}.webp", slug),
            name: slug.clone(),
            slug,
        });
    }
    entries.sort_by(|a, b| a.slug.cmp(&b.slug));

    tracing::info!(count = entries.len(), "索引已更新");
    write_json(cli.output.as_deref(), &entries)
}

fn write_json<T: Serialize + ?Sized>(output: Option<&Path>, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, json).with_context(|| format!("无法写入输出文件: {}", path.display()))?;
            tracing::info!(path = %path.display(), "已写入");
        }
        None => println!("{}", json),
    }
    Ok(())
}
