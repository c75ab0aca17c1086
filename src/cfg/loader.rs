//! 配置文件加载
//!
//! 根据扩展名在 JSON(JSON5)/YAML/TOML 之间选择解析器

use anyhow::{anyhow, Context, Result};
use serde::de::DeserializeOwned;
use std::path::Path;

/// 从 JSON 字符串解析（支持 JSON5：注释、尾随逗号、未引用的键）
pub fn from_json<T: DeserializeOwned>(content: &str) -> Result<T> {
    Ok(json5::from_str(content)?)
}

/// 从 YAML 字符串解析
pub fn from_yaml<T: DeserializeOwned>(content: &str) -> Result<T> {
    Ok(serde_yaml::from_str(content)?)
}

/// 从 TOML 字符串解析
pub fn from_toml<T: DeserializeOwned>(content: &str) -> Result<T> {
    Ok(toml::from_str(content)?)
}

/// 按扩展名解析配置内容
pub fn parse_by_extension<T: DeserializeOwned>(content: &str, ext: &str) -> Result<T> {
    match ext.to_ascii_lowercase().as_str() {
        "json" | "json5" => from_json(content),
        "yaml" | "yml" => from_yaml(content),
        "toml" => from_toml(content),
        other => Err(anyhow!("unsupported config format: {}", other)),
    }
}

/// 读取并解析配置文件
///
/// 路径支持 `~` 展开
pub fn load_file<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let raw = path.as_ref().to_string_lossy();
    let expanded = shellexpand::tilde(raw.as_ref()).to_string();
    let path = Path::new(&expanded);

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .ok_or_else(|| anyhow!("config file has no extension: {}", path.display()))?;

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;

    parse_by_extension(&content, ext)
        .with_context(|| format!("failed to parse config file: {}", path.display()))
}
