use crate::log::sink::WriteSink;
use serde::Deserialize;
use std::io::{self, IsTerminal, Write};
use std::sync::Mutex;

/// 控制台目标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    #[default]
    Stdout,
    Stderr,
}

impl Target {
    /// 解析 "stdout" / "stderr"，其他字符串返回 None
    pub fn parse(destination: &str) -> Option<Self> {
        match destination {
            "stdout" => Some(Target::Stdout),
            "stderr" => Some(Target::Stderr),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        match self {
            Target::Stdout => io::stdout().is_terminal(),
            Target::Stderr => io::stderr().is_terminal(),
        }
    }
}

/// ConsoleSink 配置
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ConsoleSinkConfig {
    pub target: Target,
}

/// 终端输出端
///
/// 写入时持有自身的锁，并发写入的记录不会交错
pub struct ConsoleSink {
    target: Target,
    lock: Mutex<()>,
}

impl ConsoleSink {
    pub fn new(config: ConsoleSinkConfig) -> Self {
        Self {
            target: config.target,
            lock: Mutex::new(()),
        }
    }

    pub fn stdout() -> Self {
        Self::new(ConsoleSinkConfig {
            target: Target::Stdout,
        })
    }

    pub fn stderr() -> Self {
        Self::new(ConsoleSinkConfig {
            target: Target::Stderr,
        })
    }

    pub fn target(&self) -> Target {
        self.target
    }
}

impl WriteSink for ConsoleSink {
    fn write(&self, buf: &[u8]) -> io::Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        match self.target {
            Target::Stdout => io::stdout().lock().write_all(buf),
            Target::Stderr => io::stderr().lock().write_all(buf),
        }
    }

    fn sync(&self) -> io::Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        match self.target {
            Target::Stdout => io::stdout().lock().flush(),
            Target::Stderr => io::stderr().lock().flush(),
        }
    }
}

crate::impl_from!(ConsoleSinkConfig => ConsoleSink);
