//! logx - 分级、多输出端的结构化日志库
//!
//! ## 模块
//!
//! - **cfg**: 配置加载（JSON5 / YAML / TOML）与 serde 辅助
//! - **log**: 日志子系统（级别、编码器、输出端、采样、Logger 树、进程级实例）

pub mod cfg;
pub mod log;

// 重新导出主要的公共 API
pub use self::log::{Level, LogConfig, LogError, Logger, MetadataValue};
