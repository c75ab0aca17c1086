//! 日志模块
//!
//! 分级、多输出端的结构化日志。
//!
//! # 特性
//!
//! - 六个级别：Debug, Info, Warn, Error, Panic, Fatal，阈值可在运行时原子修改
//! - 两种编码器：json、console，可通过注册表扩展
//! - 输出端：stdout / stderr、按大小切分并压缩的日志文件
//! - 按 (级别, 消息, 调用位置) 采样，限制日志风暴
//! - 以名称派生子 Logger，flush 级联刷新所有子 Logger
//!
//! # 快速开始
//!
//! ```rust,no_run
//! use logx::log::{self, LogConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = LogConfig::from_yaml(r#"
//! level: info
//! format: json
//! output: [stdout, /tmp/logx/info.log]
//! err_output: [stderr, /tmp/logx/error.log]
//! "#)?;
//!
//!     log::init(&config)?;
//!
//!     let db = log::named("db");
//!     db.infom("connected", [("pool", 10.into())]);
//!     log::warn("disk almost full");
//!
//!     log::flush();
//!     Ok(())
//! }
//! ```

pub mod bridge;
pub mod builder;
pub mod config;
pub mod core;
pub mod encoder;
pub mod error;
pub mod global;
pub mod level;
pub mod log_record;
pub mod logger;
#[macro_use]
pub mod macros;
pub mod sampler;
pub mod sink;
pub mod terminator;

// 重新导出核心类型
pub use bridge::{LogBridge, SqlLogLevel, SqlLogger};
pub use builder::{build, build_with, console_pair};
pub use config::{AppMode, LogConfig};
pub use self::core::{Core, IoCore, Tee};
pub use encoder::{
    create_encoder, register_encoder, ConsoleEncoder, Encoder, EncoderConfig, JsonEncoder,
};
pub use error::{LogError, Result};
pub use level::{Level, LevelFilter, LevelGate};
pub use log_record::{Caller, LogRecord, MetadataValue};
pub use logger::Logger;
pub use sampler::{Clock, Sampler, SamplerConfig, SystemClock};
pub use sink::{
    open_sink, ConsoleSink, MemorySink, RollingFileSink, RollingFileSinkConfig, Target, WriteSink,
};
pub use terminator::{ProcessTerminator, Terminator};

// 重新导出进程级 Logger 的函数
pub use global::{
    debug, debugf, debugm, dev_instance, env, error, errorf, errorm, fatal, fatalf, flush, info,
    infof, infom, init, instance, is_initialized, level, log, logf, logger, logm, named, panic,
    prod_instance, set_env, set_level, set_logger, warn, warnf, warnm, Env,
};
