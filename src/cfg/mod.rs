//! cfg 模块 - 配置加载辅助
//!
//! 日志配置的文件解析、人类可读时长、以及配置到组件的转换宏

pub mod loader;
#[macro_use]
pub mod macros;
pub mod serde_duration;

pub use loader::{from_json, from_toml, from_yaml, load_file, parse_by_extension};
pub use serde_duration::{format_duration, parse_duration, HumanDur};
