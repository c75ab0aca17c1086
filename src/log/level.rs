use crate::log::error::LogError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// 日志级别
///
/// 全序：Debug < Info < Warn < Error < Panic < Fatal
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Level {
    /// 调试信息
    Debug = 0,
    /// 一般信息
    Info = 1,
    /// 警告信息
    Warn = 2,
    /// 错误信息
    Error = 3,
    /// 记录后触发 panic
    Panic = 4,
    /// 记录后终止进程
    Fatal = 5,
}

impl Level {
    pub const ALL: [Level; 6] = [
        Level::Debug,
        Level::Info,
        Level::Warn,
        Level::Error,
        Level::Panic,
        Level::Fatal,
    ];

    /// 小写名称，与配置文件中的写法一致
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Panic => "panic",
            Level::Fatal => "fatal",
        }
    }

    /// 大写名称
    pub fn as_capital_str(&self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Panic => "PANIC",
            Level::Fatal => "FATAL",
        }
    }

    /// panic / fatal 级别在记录后不会返回调用方
    pub fn is_terminal(&self) -> bool {
        matches!(self, Level::Panic | Level::Fatal)
    }

    fn from_u8(v: u8) -> Level {
        match v {
            0 => Level::Debug,
            1 => Level::Info,
            2 => Level::Warn,
            3 => Level::Error,
            4 => Level::Panic,
            _ => Level::Fatal,
        }
    }
}

impl FromStr for Level {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" | "warning" => Ok(Level::Warn),
            "error" => Ok(Level::Error),
            "panic" => Ok(Level::Panic),
            "fatal" => Ok(Level::Fatal),
            _ => Err(LogError::InvalidLevel(s.to_string())),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Level {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Level {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// 共享的级别阈值
///
/// 一个根 Logger 只有一个 LevelGate，派生的子 Logger 和 Core 共享同一个实例
#[derive(Debug, Clone)]
pub struct LevelGate {
    level: Arc<AtomicU8>,
}

impl LevelGate {
    pub fn new(level: Level) -> Self {
        Self {
            level: Arc::new(AtomicU8::new(level as u8)),
        }
    }

    pub fn level(&self) -> Level {
        Level::from_u8(self.level.load(Ordering::Acquire))
    }

    pub fn set_level(&self, level: Level) {
        self.level.store(level as u8, Ordering::Release);
    }

    /// level >= 阈值
    pub fn enabled(&self, level: Level) -> bool {
        level >= self.level()
    }

    /// 两个句柄是否指向同一个阈值
    pub fn same_gate(&self, other: &LevelGate) -> bool {
        Arc::ptr_eq(&self.level, &other.level)
    }
}

impl Default for LevelGate {
    fn default() -> Self {
        Self::new(Level::Info)
    }
}

/// Core 的级别路由规则
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelFilter {
    /// 所有级别
    All,
    /// 恰好等于
    Equals(Level),
    /// 大于等于
    AtLeast(Level),
    /// 严格小于
    Below(Level),
    /// 闭区间 [low, high]
    Range(Level, Level),
}

impl LevelFilter {
    pub fn matches(&self, level: Level) -> bool {
        match *self {
            LevelFilter::All => true,
            LevelFilter::Equals(l) => level == l,
            LevelFilter::AtLeast(l) => level >= l,
            LevelFilter::Below(l) => level < l,
            LevelFilter::Range(low, high) => level >= low && level <= high,
        }
    }
}

impl Default for LevelFilter {
    fn default() -> Self {
        LevelFilter::All
    }
}
