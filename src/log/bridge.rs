use crate::log::level::Level;
use crate::log::log_record::{Caller, MetadataValue};
use crate::log::logger::Logger;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// SQL 引擎日志的五级刻度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlLogLevel {
    Debug,
    Info,
    Warning,
    Err,
    Off,
    Unknown,
}

impl From<Level> for SqlLogLevel {
    fn from(level: Level) -> Self {
        match level {
            Level::Debug => SqlLogLevel::Debug,
            Level::Info => SqlLogLevel::Info,
            Level::Warn => SqlLogLevel::Warning,
            Level::Error => SqlLogLevel::Err,
            Level::Panic => SqlLogLevel::Off,
            Level::Fatal => SqlLogLevel::Unknown,
        }
    }
}

impl SqlLogLevel {
    /// Unknown 没有对应级别
    pub fn to_level(self) -> Option<Level> {
        match self {
            SqlLogLevel::Debug => Some(Level::Debug),
            SqlLogLevel::Info => Some(Level::Info),
            SqlLogLevel::Warning => Some(Level::Warn),
            SqlLogLevel::Err => Some(Level::Error),
            SqlLogLevel::Off => Some(Level::Panic),
            SqlLogLevel::Unknown => None,
        }
    }
}

/// 供 SQL 引擎使用的日志适配器
///
/// 记录写到 `<logger>.raw`，并多跳过一层调用栈
pub struct SqlLogger {
    base: Arc<Logger>,
    show_sql: AtomicBool,
}

impl SqlLogger {
    pub fn new(logger: &Logger) -> Self {
        let base = logger.named("raw");
        base.add_caller_skip(1);
        Self {
            base,
            show_sql: AtomicBool::new(false),
        }
    }

    pub fn logger(&self) -> &Arc<Logger> {
        &self.base
    }

    pub fn level(&self) -> SqlLogLevel {
        self.base.level().into()
    }

    pub fn set_level(&self, level: SqlLogLevel) {
        if let Some(level) = level.to_level() {
            self.base.set_level(level);
        }
    }

    pub fn show_sql(&self, show: bool) {
        self.show_sql.store(show, Ordering::Relaxed);
    }

    pub fn is_show_sql(&self) -> bool {
        self.show_sql.load(Ordering::Relaxed)
    }

    #[track_caller]
    pub fn debug(&self, message: impl Into<String>) {
        self.base.debug(message)
    }

    #[track_caller]
    pub fn debugf(&self, args: fmt::Arguments<'_>) {
        self.base.debugf(args)
    }

    #[track_caller]
    pub fn info(&self, message: impl Into<String>) {
        self.base.info(message)
    }

    #[track_caller]
    pub fn infof(&self, args: fmt::Arguments<'_>) {
        self.base.infof(args)
    }

    #[track_caller]
    pub fn warn(&self, message: impl Into<String>) {
        self.base.warn(message)
    }

    #[track_caller]
    pub fn warnf(&self, args: fmt::Arguments<'_>) {
        self.base.warnf(args)
    }

    #[track_caller]
    pub fn error(&self, message: impl Into<String>) {
        self.base.error(message)
    }

    #[track_caller]
    pub fn errorf(&self, args: fmt::Arguments<'_>) {
        self.base.errorf(args)
    }
}

/// `log` crate 到 Logger 的桥接
///
/// trace 并入 debug；调用位置取自 `log::Record` 自身的文件和行号
pub struct LogBridge {
    logger: Arc<Logger>,
}

impl LogBridge {
    pub fn new(logger: Arc<Logger>) -> Self {
        Self { logger }
    }

    /// 安装为 `log` crate 的全局 logger
    pub fn install(logger: Arc<Logger>) -> Result<(), ::log::SetLoggerError> {
        ::log::set_boxed_logger(Box::new(Self::new(logger)))?;
        ::log::set_max_level(::log::LevelFilter::Trace);
        Ok(())
    }

    fn map_level(level: ::log::Level) -> Level {
        match level {
            ::log::Level::Error => Level::Error,
            ::log::Level::Warn => Level::Warn,
            ::log::Level::Info => Level::Info,
            ::log::Level::Debug | ::log::Level::Trace => Level::Debug,
        }
    }
}

impl ::log::Log for LogBridge {
    fn enabled(&self, metadata: &::log::Metadata<'_>) -> bool {
        self.logger.enabled(Self::map_level(metadata.level()))
    }

    fn log(&self, record: &::log::Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let caller = match (record.file(), record.line()) {
            (Some(file), Some(line)) => Caller::new(file, line),
            (Some(file), None) => Caller::new(file, 0),
            _ => Caller::new(record.module_path().unwrap_or("<unknown>"), 0),
        };
        let fields = vec![(
            "target".to_string(),
            MetadataValue::from(record.target()),
        )];
        self.logger.log_with_caller(
            Self::map_level(record.level()),
            record.args().to_string(),
            fields,
            caller,
        );
    }

    fn flush(&self) {
        self.logger.flush();
    }
}
