use crate::log::builder::{build, console_pair};
use crate::log::config::LogConfig;
use crate::log::encoder::EncoderConfig;
use crate::log::error::Result;
use crate::log::level::Level;
use crate::log::log_record::MetadataValue;
use crate::log::logger::Logger;
use once_cell::sync::{Lazy, OnceCell};
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, RwLock};

/// 进程级 Logger，由 [`init`] 发布
static GLOBAL_LOGGER: Lazy<RwLock<Option<Arc<Logger>>>> = Lazy::new(|| RwLock::new(None));

static DEV_INSTANCE: OnceCell<Arc<Logger>> = OnceCell::new();
static PROD_INSTANCE: OnceCell<Arc<Logger>> = OnceCell::new();
static ENV: AtomicU8 = AtomicU8::new(Env::Prod as u8);

/// 按配置构建 Logger 并发布为进程级实例
///
/// 再次调用会替换已发布的实例；构建失败时已发布的实例保持不变
///
/// # 示例
///
/// ```ignore
/// let config = LogConfig::from_file("app.yaml")?;
/// logx::log::init(&config)?;
/// logx::log::info("application started");
/// logx::log::flush();
/// ```
pub fn init(config: &LogConfig) -> Result<()> {
    let logger = build(config)?;
    set_logger(logger);
    Ok(())
}

/// 直接发布一个已构建好的 Logger
pub fn set_logger(logger: Logger) -> Arc<Logger> {
    let logger = Arc::new(logger);
    *GLOBAL_LOGGER.write().unwrap_or_else(|e| e.into_inner()) = Some(logger.clone());
    logger
}

pub fn is_initialized() -> bool {
    GLOBAL_LOGGER
        .read()
        .unwrap_or_else(|e| e.into_inner())
        .is_some()
}

/// 进程级 Logger
///
/// # Panics
///
/// 在 [`init`] 之前调用会 panic
pub fn logger() -> Arc<Logger> {
    match GLOBAL_LOGGER
        .read()
        .unwrap_or_else(|e| e.into_inner())
        .as_ref()
    {
        Some(logger) => logger.clone(),
        None => panic!("log is not initialized"),
    }
}

/// 从进程级 Logger 派生子 Logger
pub fn named(name: &str) -> Arc<Logger> {
    logger().named(name)
}

/// 刷新进程级 Logger 及其所有子 Logger
pub fn flush() {
    logger().flush()
}

pub fn level() -> Level {
    logger().level()
}

pub fn set_level(level: Level) {
    logger().set_level(level)
}

/// 预置实例的选择
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Env {
    Prod = 0,
    Dev = 1,
}

pub fn env() -> Env {
    match ENV.load(Ordering::Relaxed) {
        1 => Env::Dev,
        _ => Env::Prod,
    }
}

pub fn set_env(env: Env) {
    ENV.store(env as u8, Ordering::Relaxed);
}

/// 按 [`env`] 返回开发或生产预置实例
pub fn instance() -> Arc<Logger> {
    match env() {
        Env::Prod => prod_instance(),
        Env::Dev => dev_instance(),
    }
}

/// 开发预置实例：debug 级别，开发编码器预设
///
/// 不依赖 [`init`]，首次使用时构建
pub fn dev_instance() -> Arc<Logger> {
    DEV_INSTANCE
        .get_or_init(|| Arc::new(console_pair(Level::Debug, EncoderConfig::development())))
        .clone()
}

/// 生产预置实例：info 级别，生产编码器预设
pub fn prod_instance() -> Arc<Logger> {
    PROD_INSTANCE
        .get_or_init(|| Arc::new(console_pair(Level::Info, EncoderConfig::production())))
        .clone()
}

// ========== 进程级 Logger 的便捷 log 方法 ==========

#[track_caller]
pub fn log(level: Level, message: impl Into<String>) {
    logger().log(level, message)
}

#[track_caller]
pub fn logf(level: Level, args: fmt::Arguments<'_>) {
    logger().logf(level, args)
}

#[track_caller]
pub fn logm(
    level: Level,
    message: impl Into<String>,
    fields: impl IntoIterator<Item = (impl Into<String>, MetadataValue)>,
) {
    logger().logm(level, message, fields)
}

#[track_caller]
pub fn debug(message: impl Into<String>) {
    logger().debug(message)
}

#[track_caller]
pub fn info(message: impl Into<String>) {
    logger().info(message)
}

#[track_caller]
pub fn warn(message: impl Into<String>) {
    logger().warn(message)
}

#[track_caller]
pub fn error(message: impl Into<String>) {
    logger().error(message)
}

#[track_caller]
pub fn panic(message: impl Into<String>) -> ! {
    logger().panic(message)
}

#[track_caller]
pub fn fatal(message: impl Into<String>) -> ! {
    logger().fatal(message)
}

#[track_caller]
pub fn debugf(args: fmt::Arguments<'_>) {
    logger().debugf(args)
}

#[track_caller]
pub fn infof(args: fmt::Arguments<'_>) {
    logger().infof(args)
}

#[track_caller]
pub fn warnf(args: fmt::Arguments<'_>) {
    logger().warnf(args)
}

#[track_caller]
pub fn errorf(args: fmt::Arguments<'_>) {
    logger().errorf(args)
}

#[track_caller]
pub fn panicf(args: fmt::Arguments<'_>) -> ! {
    logger().panicf(args)
}

#[track_caller]
pub fn fatalf(args: fmt::Arguments<'_>) -> ! {
    logger().fatalf(args)
}

#[track_caller]
pub fn debugm(
    message: impl Into<String>,
    fields: impl IntoIterator<Item = (impl Into<String>, MetadataValue)>,
) {
    logger().debugm(message, fields)
}

#[track_caller]
pub fn infom(
    message: impl Into<String>,
    fields: impl IntoIterator<Item = (impl Into<String>, MetadataValue)>,
) {
    logger().infom(message, fields)
}

#[track_caller]
pub fn warnm(
    message: impl Into<String>,
    fields: impl IntoIterator<Item = (impl Into<String>, MetadataValue)>,
) {
    logger().warnm(message, fields)
}

#[track_caller]
pub fn errorm(
    message: impl Into<String>,
    fields: impl IntoIterator<Item = (impl Into<String>, MetadataValue)>,
) {
    logger().errorm(message, fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_env_selects_instance() {
        assert!(Arc::ptr_eq(&dev_instance(), &dev_instance()));
        assert!(Arc::ptr_eq(&prod_instance(), &prod_instance()));
        assert!(!Arc::ptr_eq(&dev_instance(), &prod_instance()));

        assert_eq!(dev_instance().level(), Level::Debug);
        assert_eq!(prod_instance().level(), Level::Info);
    }

    #[test]
    #[serial]
    fn test_set_env() {
        assert_eq!(env(), Env::Prod);
        assert!(Arc::ptr_eq(&instance(), &prod_instance()));

        set_env(Env::Dev);
        assert!(Arc::ptr_eq(&instance(), &dev_instance()));
        set_env(Env::Prod);
    }

    #[test]
    fn test_concurrent_dev_instance_built_once() {
        let handles: Vec<_> = (0..8).map(|_| std::thread::spawn(dev_instance)).collect();
        let instances: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(instances.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }
}
