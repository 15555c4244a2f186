pub mod assets;
pub mod catalog;
pub mod config;
pub mod datatypes;
pub mod io;
pub mod labels;
pub mod lookup;
pub mod nickname;
pub mod schema;
pub mod sheet;
pub mod tooltip;
pub mod utils;

// 重新导出主要结构
pub use assets::{AssetCandidateList, AssetKind, AssetLoad, AssetResolver, AssetState, DataRoot};
pub use catalog::{Catalog, CatalogQuery, CatalogSources, Chip, SortKey};
pub use config::CatalogConfig;
pub use io::{CachedSource, DirectorySource, DocumentSource, MemorySource};
pub use labels::{LabelTranslator, PathLabel};
pub use lookup::LookupTable;
pub use nickname::NicknameResolver;
pub use schema::{AbilityKind, AbilityRecord, CharacterOverride, CharacterRecord, ParamTable};
pub use sheet::{CharacterSheet, SheetBuilder, SheetData};
pub use tooltip::{KeywordSet, TooltipEngine};
pub use utils::{make_slug, rarity_stars, CatalogError};

// 常量定义
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
