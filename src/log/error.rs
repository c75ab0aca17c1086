use thiserror::Error;

/// 日志子系统错误
///
/// 前三类属于配置错误，只会在初始化阶段出现；写入失败不会传递给日志调用方
#[derive(Error, Debug)]
pub enum LogError {
    #[error("invalid log level: {0}")]
    InvalidLevel(String),

    #[error("unsupported encoding: {0}")]
    UnsupportedEncoding(String),

    #[error("failed to open sink {path}: {source}")]
    SinkOpenFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid log config: {0}")]
    InvalidConfig(String),

    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl LogError {
    /// 是否属于初始化期的配置错误
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            LogError::InvalidLevel(_)
                | LogError::UnsupportedEncoding(_)
                | LogError::SinkOpenFailed { .. }
                | LogError::InvalidConfig(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, LogError>;
