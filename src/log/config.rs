use crate::cfg;
use crate::log::encoder::{is_registered, EncoderConfig};
use crate::log::error::{LogError, Result};
use crate::log::level::Level;
use crate::log::sampler::SamplerConfig;
use crate::log::sink::RollingFileSinkConfig;
use garde::Validate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use smart_default::SmartDefault;
use std::collections::BTreeMap;
use std::path::Path;

/// 运行模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AppMode {
    #[default]
    Development,
    Staging,
    Production,
}

impl AppMode {
    pub fn is_development(&self) -> bool {
        *self == AppMode::Development
    }

    pub fn is_production(&self) -> bool {
        *self == AppMode::Production
    }

    /// 调用栈采集阈值：开发模式为 warn，其他模式为 error
    pub fn stack_level(&self) -> Level {
        if self.is_development() {
            Level::Warn
        } else {
            Level::Error
        }
    }

    pub fn encoder_config(&self) -> EncoderConfig {
        if self.is_development() {
            EncoderConfig::development()
        } else {
            EncoderConfig::production()
        }
    }
}

/// 日志配置
///
/// # 示例
///
/// ```yaml
/// mode: production
/// level: info
/// format: json
/// output: [stdout, /var/log/app/info.log]
/// err_output: [stderr, /var/log/app/error.log]
/// max_size: 100
/// sampling:
///   initial: 100
///   thereafter: 100
///   tick: 1s
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, SmartDefault, Validate)]
#[serde(default)]
pub struct LogConfig {
    /// 运行模式，决定调用栈阈值与编码器预设
    #[garde(skip)]
    pub mode: AppMode,

    /// 日志级别: debug / info / warn / error / panic / fatal
    #[default = "info"]
    #[garde(length(min = 1))]
    pub level: String,

    /// 编码格式: json / console（或已注册的其他编码器）
    #[default = "console"]
    #[garde(length(min = 1))]
    pub format: String,

    /// 普通输出，接收 error 以下的记录
    #[default(vec!["stdout".to_string()])]
    #[garde(length(min = 1), inner(length(min = 1)))]
    pub output: Vec<String>,

    /// 错误输出，接收 error 及以上的记录
    #[default(vec!["stderr".to_string()])]
    #[garde(length(min = 1), inner(length(min = 1)))]
    pub err_output: Vec<String>,

    /// 单个日志文件最大大小（MB）
    #[default = 500]
    #[garde(range(min = 1))]
    pub max_size: u64,

    /// 备份文件最多保留天数
    #[default = 7]
    #[garde(skip)]
    pub max_age: u32,

    /// 备份文件最多保留个数
    #[default = 3]
    #[garde(skip)]
    pub max_backups: usize,

    /// 是否压缩备份文件
    #[default = true]
    #[garde(skip)]
    pub compress: bool,

    /// 备份文件名是否使用本地时间
    #[default = true]
    #[garde(skip)]
    pub local_time: bool,

    /// 是否记录调用位置
    #[default = true]
    #[garde(skip)]
    pub caller: bool,

    /// 是否在达到阈值时记录调用栈
    #[default = true]
    #[garde(skip)]
    pub stacktrace: bool,

    /// 采样配置，不设置时不采样
    #[garde(dive)]
    pub sampling: Option<SamplerConfig>,

    /// 附加到每条记录的字段（按键排序）
    #[garde(skip)]
    pub initial_fields: BTreeMap<String, Value>,

    /// 日志目录，设置后覆盖 output / err_output 为 `<dir>/info.log` / `<dir>/error.log`
    #[garde(skip)]
    pub log_dir: Option<String>,
}

impl LogConfig {
    pub fn from_json(content: &str) -> anyhow::Result<Self> {
        cfg::from_json(content)
    }

    pub fn from_yaml(content: &str) -> anyhow::Result<Self> {
        cfg::from_yaml(content)
    }

    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        cfg::from_toml(content)
    }

    /// 按扩展名读取配置文件
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        cfg::load_file(path)
    }

    /// 结构校验 + 级别解析 + 编码器检查
    pub fn check(&self) -> Result<()> {
        Validate::validate(self).map_err(|e| LogError::InvalidConfig(e.to_string()))?;
        self.parse_level()?;
        if !is_registered(&self.format) {
            return Err(LogError::UnsupportedEncoding(self.format.clone()));
        }
        Ok(())
    }

    pub fn parse_level(&self) -> Result<Level> {
        self.level.parse()
    }

    /// 实际生效的 (output, err_output)
    pub fn destinations(&self) -> (Vec<String>, Vec<String>) {
        match self.log_dir.as_deref().map(|d| d.trim_end_matches('/')) {
            Some(dir) if !dir.is_empty() => (
                vec![format!("{}/info.log", dir)],
                vec![format!("{}/error.log", dir)],
            ),
            _ => (self.output.clone(), self.err_output.clone()),
        }
    }

    /// 文件输出端的切分参数
    pub fn rotation(&self) -> RollingFileSinkConfig {
        RollingFileSinkConfig {
            filename: String::new(),
            max_size: self.max_size.saturating_mul(1024 * 1024),
            max_age: self.max_age,
            max_backups: self.max_backups,
            compress: self.compress,
            local_time: self.local_time,
        }
    }

    /// 调用栈采集阈值，关闭时为 None
    pub fn stack_level(&self) -> Option<Level> {
        self.stacktrace.then(|| self.mode.stack_level())
    }
}
