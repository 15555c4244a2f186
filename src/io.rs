/// 文档加载抽象层
///
/// 引擎只依赖 [`DocumentSource`] trait，不关心文档来自文件系统、内存还是网络。
///
/// # 架构设计
///
/// - **traits**: 定义 `DocumentSource` 接口
/// - **fs_source**: 文件系统与内存实现
/// - **cache**: 按请求键缓存的只读包装
/// - **loader**: 并行加载一组文档，区分必需与可选
///
/// # 使用示例
///
/// ```rust,ignore
/// use hsr_catalog::io::{DirectorySource, DocumentSource};
///
/// let source = DirectorySource::new("data/index_min/fr");
/// let characters = source.fetch("characters.json")?;
/// ```
pub mod traits;
pub mod fs_source;
pub mod cache;
pub mod loader;

// === 导出 trait 定义 ===
pub use traits::DocumentSource;

// === 导出默认实现 ===
pub use cache::CachedSource;
pub use fs_source::{DirectorySource, MemorySource};
pub use loader::{
    load_documents, override_key, resolve_index_dir, DocumentSpec, LoadedDocuments, AVATARS,
    CHARACTERS, ELEMENTS, LIGHT_CONES, LIGHT_CONE_RANKS, NICKNAMES, PATHS, PROPERTIES,
    RELIC_SETS, SKILLS, SKILL_TREES, RANKS,
};
