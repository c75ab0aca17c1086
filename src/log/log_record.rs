use crate::cfg::serde_duration::format_duration;
use crate::log::level::Level;
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::panic::Location;
use std::time::Duration;

/// 字段值，支持多种类型
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataValue {
    String(String),
    I64(i64),
    U64(u64),
    F64(f64),
    Bool(bool),
    Null,
    /// 时长，编码为 "1m30s" 形式
    Duration(Duration),
    /// 任意 JSON 兼容的数据
    Json(Value),
}

impl Serialize for MetadataValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            MetadataValue::String(s) => serializer.serialize_str(s),
            MetadataValue::I64(n) => serializer.serialize_i64(*n),
            MetadataValue::U64(n) => serializer.serialize_u64(*n),
            MetadataValue::F64(n) => serializer.serialize_f64(*n),
            MetadataValue::Bool(b) => serializer.serialize_bool(*b),
            MetadataValue::Null => serializer.serialize_none(),
            MetadataValue::Duration(d) => serializer.serialize_str(&format_duration(*d)),
            MetadataValue::Json(v) => v.serialize(serializer),
        }
    }
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::String(s) => write!(f, "{}", s),
            MetadataValue::I64(n) => write!(f, "{}", n),
            MetadataValue::U64(n) => write!(f, "{}", n),
            MetadataValue::F64(n) => write!(f, "{}", n),
            MetadataValue::Bool(b) => write!(f, "{}", b),
            MetadataValue::Null => write!(f, "null"),
            MetadataValue::Duration(d) => write!(f, "{}", format_duration(*d)),
            MetadataValue::Json(v) => write!(f, "{}", v),
        }
    }
}

impl MetadataValue {
    /// 从任意实现了 Serialize 的结构体创建字段值，序列化失败时为 Null
    pub fn from_struct<T: Serialize>(value: T) -> Self {
        serde_json::to_value(value)
            .map(MetadataValue::Json)
            .unwrap_or(MetadataValue::Null)
    }
}

impl From<String> for MetadataValue {
    fn from(s: String) -> Self {
        MetadataValue::String(s)
    }
}

impl From<&str> for MetadataValue {
    fn from(s: &str) -> Self {
        MetadataValue::String(s.to_string())
    }
}

impl From<i64> for MetadataValue {
    fn from(n: i64) -> Self {
        MetadataValue::I64(n)
    }
}

impl From<i32> for MetadataValue {
    fn from(n: i32) -> Self {
        MetadataValue::I64(n as i64)
    }
}

impl From<u64> for MetadataValue {
    fn from(n: u64) -> Self {
        MetadataValue::U64(n)
    }
}

impl From<u32> for MetadataValue {
    fn from(n: u32) -> Self {
        MetadataValue::U64(n as u64)
    }
}

impl From<usize> for MetadataValue {
    fn from(n: usize) -> Self {
        MetadataValue::U64(n as u64)
    }
}

impl From<f64> for MetadataValue {
    fn from(n: f64) -> Self {
        MetadataValue::F64(n)
    }
}

impl From<bool> for MetadataValue {
    fn from(b: bool) -> Self {
        MetadataValue::Bool(b)
    }
}

impl From<Duration> for MetadataValue {
    fn from(d: Duration) -> Self {
        MetadataValue::Duration(d)
    }
}

impl From<Value> for MetadataValue {
    fn from(v: Value) -> Self {
        MetadataValue::Json(v)
    }
}

/// 调用位置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub file: String,
    pub line: u32,
}

impl Caller {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

impl From<&Location<'_>> for Caller {
    fn from(location: &Location<'_>) -> Self {
        Caller::new(location.file(), location.line())
    }
}

impl fmt::Display for Caller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// 日志记录
///
/// 每次调用生成一次，写入输出端后即丢弃
#[derive(Debug, Clone)]
pub struct LogRecord {
    /// 时间戳
    pub timestamp: DateTime<Utc>,
    /// 日志级别
    pub level: Level,
    /// Logger 名称（根 Logger 为空）
    pub logger: String,
    /// 日志消息
    pub message: String,
    /// 调用位置
    pub caller: Option<Caller>,
    /// 调用栈
    pub stack: Option<String>,
    /// 结构化字段（保持插入顺序）
    pub fields: Vec<(String, MetadataValue)>,
}

impl LogRecord {
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            logger: String::new(),
            message: message.into(),
            caller: None,
            stack: None,
            fields: Vec::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        self.fields.push((key.into(), value.into()));
        self
    }

    pub fn with_logger(mut self, name: impl Into<String>) -> Self {
        self.logger = name.into();
        self
    }

    pub fn with_caller(mut self, caller: Caller) -> Self {
        self.caller = Some(caller);
        self
    }

    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_record_new() {
        let record = LogRecord::new(Level::Info, "test message");

        assert_eq!(record.level, Level::Info);
        assert_eq!(record.message, "test message");
        assert!(record.logger.is_empty());
        assert!(record.caller.is_none());
        assert!(record.stack.is_none());
        assert!(record.fields.is_empty());
    }

    #[test]
    fn test_log_record_builder() {
        let record = LogRecord::new(Level::Warn, "slow query")
            .with_logger("db.raw")
            .with_caller(Caller::new("src/db.rs", 42))
            .with_field("duration", Duration::from_millis(1500))
            .with_field("rows", 12)
            .with_field("table", "users");

        assert_eq!(record.logger, "db.raw");
        assert_eq!(record.caller.as_ref().unwrap().to_string(), "src/db.rs:42");
        assert_eq!(record.fields.len(), 3);
        assert_eq!(record.fields[0].0, "duration");
        assert!(matches!(record.fields[1].1, MetadataValue::I64(12)));
        assert!(matches!(record.fields[2].1, MetadataValue::String(_)));
    }

    #[test]
    fn test_caller_from_location() {
        let caller = Caller::from(Location::caller());
        assert!(caller.file.ends_with("log_record.rs"));
        assert!(caller.line > 0);
    }

    #[test]
    fn test_metadata_value_display() {
        assert_eq!(MetadataValue::from("hello").to_string(), "hello");
        assert_eq!(MetadataValue::I64(-4).to_string(), "-4");
        assert_eq!(MetadataValue::Bool(true).to_string(), "true");
        assert_eq!(MetadataValue::Null.to_string(), "null");
        assert_eq!(
            MetadataValue::Duration(Duration::from_secs(90)).to_string(),
            "1m30s"
        );
    }

    #[test]
    fn test_metadata_value_serialize() {
        assert_eq!(serde_json::to_string(&MetadataValue::U64(100)).unwrap(), "100");
        assert_eq!(serde_json::to_string(&MetadataValue::Null).unwrap(), "null");
        assert_eq!(
            serde_json::to_string(&MetadataValue::Duration(Duration::from_millis(250))).unwrap(),
            "\"250ms\""
        );
    }

    #[test]
    fn test_metadata_value_from_struct() {
        #[derive(Serialize)]
        struct Request {
            endpoint: String,
            status: u16,
        }

        let value = MetadataValue::from_struct(Request {
            endpoint: "/api/users".to_string(),
            status: 200,
        });
        let json = serde_json::to_value(&value).unwrap();
        assert_eq!(json["endpoint"], "/api/users");
        assert_eq!(json["status"], 200);
    }
}
