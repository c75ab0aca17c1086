use crate::log::error::Result;
use crate::log::log_record::LogRecord;
use chrono::{Local, SecondsFormat};
use serde::Deserialize;
use smart_default::SmartDefault;

/// 编码器 trait
///
/// 负责将 LogRecord 编码为一行字节（包含结尾换行）
pub trait Encoder: Send + Sync {
    fn encode(&self, record: &LogRecord) -> Result<Vec<u8>>;
}

/// 编码器配置
///
/// 字段名固定后 json 与 console 两种格式共用，便于对比
#[derive(Debug, Clone, Deserialize, SmartDefault, PartialEq)]
#[serde(default)]
pub struct EncoderConfig {
    #[default = "ts"]
    pub time_key: String,
    #[default = "level"]
    pub level_key: String,
    #[default = "logger"]
    pub name_key: String,
    #[default = "caller"]
    pub caller_key: String,
    #[default = "msg"]
    pub message_key: String,
    #[default = "stacktrace"]
    pub stacktrace_key: String,

    /// 级别使用大写
    #[default = false]
    pub capital_level: bool,

    /// console 格式下为级别着色
    #[default = false]
    pub colored: bool,

    /// 时间戳使用本地时区（否则 UTC）
    #[default = false]
    pub local_time: bool,
}

impl EncoderConfig {
    /// 生产环境预设：小写级别，不着色
    pub fn production() -> Self {
        Self::default()
    }

    /// 开发环境预设：大写级别
    pub fn development() -> Self {
        Self {
            capital_level: true,
            ..Self::default()
        }
    }

    pub fn with_colored(mut self, colored: bool) -> Self {
        self.colored = colored;
        self
    }

    pub fn with_local_time(mut self, local_time: bool) -> Self {
        self.local_time = local_time;
        self
    }

    pub(crate) fn level_text(&self, record: &LogRecord) -> &'static str {
        if self.capital_level {
            record.level.as_capital_str()
        } else {
            record.level.as_str()
        }
    }

    /// ISO-8601，毫秒精度
    pub(crate) fn time_text(&self, record: &LogRecord) -> String {
        if self.local_time {
            record
                .timestamp
                .with_timezone(&Local)
                .to_rfc3339_opts(SecondsFormat::Millis, false)
        } else {
            record.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
        }
    }
}
