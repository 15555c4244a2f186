//! 引擎配置
//!
//! 所有硬编码的表（排除 id、开拓者称呼、英文名兜底等）都集中在这里，
//! 默认值即站点当前使用的值；也可以从 JSON 文件覆盖部分字段。

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::utils::CatalogError;

/// 目录引擎配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// 数据目录候选前缀（按顺序探测）
    pub data_prefixes: Vec<String>,
    /// 资源定位符改写时使用的数据根前缀
    pub asset_root: String,
    /// 名称中的昵称占位符
    pub placeholder_token: String,
    /// 按 id 指定的昵称（开拓者的性别变体）
    pub variant_nicknames: BTreeMap<String, String>,
    /// 占位符的默认替换值
    pub default_nickname: String,
    /// 上游直接排除的 id（重复的变体记录）
    pub excluded_ids: Vec<String>,
    /// 英文名的最后兜底
    pub english_name_overrides: BTreeMap<String, String>,
    /// 没有覆盖文档时的行迹优先级
    pub default_trace_priority: Vec<String>,
    /// 角色页展示的光锥数量
    pub light_cone_limit: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        let pairs = |items: &[(&str, &str)]| {
            items
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<BTreeMap<_, _>>()
        };

        CatalogConfig {
            data_prefixes: vec![
                "../data/index/".to_string(),
                "data/index_min/fr/".to_string(),
                "data/index/".to_string(),
            ],
            asset_root: "/data/".to_string(),
            placeholder_token: "{NICKNAME}".to_string(),
            variant_nicknames: pairs(&[
                ("8002", "Pionnière"),
                ("8004", "Pionnière"),
                ("8006", "Pionnière"),
                ("8008", "Pionnière"),
            ]),
            default_nickname: "Pionnier".to_string(),
            excluded_ids: ["8001", "8003", "8005", "8007"].iter().map(|s| s.to_string()).collect(),
            english_name_overrides: pairs(&[("1310", "Firefly"), ("1307", "Black Swan")]),
            default_trace_priority: ["Talent", "Compétence", "Ultime", "ATQ normale"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            light_cone_limit: 6,
        }
    }
}

impl CatalogConfig {
    /// 从 JSON 文件加载配置，未出现的字段使用默认值
    pub fn from_json_file(path: &Path) -> Result<Self, CatalogError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self, CatalogError> {
        let config: CatalogConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        if self.placeholder_token.is_empty() {
            return Err(CatalogError::InvalidConfig("placeholder_token must not be empty".into()));
        }
        if self.data_prefixes.is_empty() {
            return Err(CatalogError::InvalidConfig("data_prefixes must list at least one prefix".into()));
        }
        Ok(())
    }

    pub fn is_excluded(&self, id: &str) -> bool {
        self.excluded_ids.iter().any(|excluded| excluded == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CatalogConfig::default();
        assert!(config.is_excluded("8001"));
        assert!(!config.is_excluded("8002"));
        assert_eq!(config.variant_nicknames.get("8008").map(String::as_str), Some("Pionnière"));
        assert_eq!(config.default_trace_priority.len(), 4);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = CatalogConfig::from_json_str(r#"{"light_cone_limit": 3, "excluded_ids": []}"#).unwrap();
        assert_eq!(config.light_cone_limit, 3);
        assert!(!config.is_excluded("8001"));
        assert_eq!(config.placeholder_token, "{NICKNAME}");
    }

    #[test]
    fn test_invalid_config() {
        let err = CatalogConfig::from_json_str(r#"{"placeholder_token": ""}"#).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidConfig(_)));
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, r#"{"default_nickname": "Trailblazer"}"#).unwrap();
        let config = CatalogConfig::from_json_file(&path).unwrap();
        assert_eq!(config.default_nickname, "Trailblazer");
    }
}
