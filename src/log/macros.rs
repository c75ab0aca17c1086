//! 日志宏
//!
//! 在调用处展开，记录的调用位置即宏所在的文件和行号
//!
//! # 示例
//!
//! ```ignore
//! use logx::{info, ginfo};
//!
//! // 格式化消息
//! info!(logger, "user {} logged in", user_id);
//!
//! // 带字段的消息
//! info!(logger, "user logged in"; "user_id" => 12345, "username" => "alice");
//!
//! // 使用进程级 Logger
//! ginfo!("server listening on {}", addr);
//! ginfo!("request done"; "status" => 200);
//! ```

/// 记录 DEBUG 级别日志
#[macro_export]
macro_rules! debug {
    ($logger:expr, $msg:expr; $($key:expr => $value:expr),+ $(,)?) => {
        $logger.debugm($msg, [$(($key, $crate::log::MetadataValue::from($value))),+])
    };
    ($logger:expr, $($arg:tt)+) => {
        $logger.debugf(format_args!($($arg)+))
    };
}

/// 记录 INFO 级别日志
#[macro_export]
macro_rules! info {
    ($logger:expr, $msg:expr; $($key:expr => $value:expr),+ $(,)?) => {
        $logger.infom($msg, [$(($key, $crate::log::MetadataValue::from($value))),+])
    };
    ($logger:expr, $($arg:tt)+) => {
        $logger.infof(format_args!($($arg)+))
    };
}

/// 记录 WARN 级别日志
#[macro_export]
macro_rules! warn {
    ($logger:expr, $msg:expr; $($key:expr => $value:expr),+ $(,)?) => {
        $logger.warnm($msg, [$(($key, $crate::log::MetadataValue::from($value))),+])
    };
    ($logger:expr, $($arg:tt)+) => {
        $logger.warnf(format_args!($($arg)+))
    };
}

/// 记录 ERROR 级别日志
#[macro_export]
macro_rules! error {
    ($logger:expr, $msg:expr; $($key:expr => $value:expr),+ $(,)?) => {
        $logger.errorm($msg, [$(($key, $crate::log::MetadataValue::from($value))),+])
    };
    ($logger:expr, $($arg:tt)+) => {
        $logger.errorf(format_args!($($arg)+))
    };
}

/// 记录 FATAL 级别日志，记录后以状态码 1 退出进程
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $msg:expr; $($key:expr => $value:expr),+ $(,)?) => {
        $logger.fatalm($msg, [$(($key, $crate::log::MetadataValue::from($value))),+])
    };
    ($logger:expr, $($arg:tt)+) => {
        $logger.fatalf(format_args!($($arg)+))
    };
}

/// 使用进程级 Logger 记录 DEBUG 级别日志
#[macro_export]
macro_rules! gdebug {
    ($msg:expr; $($key:expr => $value:expr),+ $(,)?) => {
        $crate::log::debugm($msg, [$(($key, $crate::log::MetadataValue::from($value))),+])
    };
    ($($arg:tt)+) => {
        $crate::log::debugf(format_args!($($arg)+))
    };
}

/// 使用进程级 Logger 记录 INFO 级别日志
#[macro_export]
macro_rules! ginfo {
    ($msg:expr; $($key:expr => $value:expr),+ $(,)?) => {
        $crate::log::infom($msg, [$(($key, $crate::log::MetadataValue::from($value))),+])
    };
    ($($arg:tt)+) => {
        $crate::log::infof(format_args!($($arg)+))
    };
}

/// 使用进程级 Logger 记录 WARN 级别日志
#[macro_export]
macro_rules! gwarn {
    ($msg:expr; $($key:expr => $value:expr),+ $(,)?) => {
        $crate::log::warnm($msg, [$(($key, $crate::log::MetadataValue::from($value))),+])
    };
    ($($arg:tt)+) => {
        $crate::log::warnf(format_args!($($arg)+))
    };
}

/// 使用进程级 Logger 记录 ERROR 级别日志
#[macro_export]
macro_rules! gerror {
    ($msg:expr; $($key:expr => $value:expr),+ $(,)?) => {
        $crate::log::errorm($msg, [$(($key, $crate::log::MetadataValue::from($value))),+])
    };
    ($($arg:tt)+) => {
        $crate::log::errorf(format_args!($($arg)+))
    };
}

/// 使用进程级 Logger 记录 FATAL 级别日志
#[macro_export]
macro_rules! gfatal {
    ($msg:expr; $($key:expr => $value:expr),+ $(,)?) => {
        $crate::log::fatalm($msg, [$(($key, $crate::log::MetadataValue::from($value))),+])
    };
    ($($arg:tt)+) => {
        $crate::log::fatalf(format_args!($($arg)+))
    };
}

#[cfg(test)]
mod tests {
    use crate::log::core::IoCore;
    use crate::log::encoder::{EncoderConfig, JsonEncoder};
    use crate::log::level::{Level, LevelFilter, LevelGate};
    use crate::log::logger::Logger;
    use crate::log::sink::MemorySink;
    use std::sync::Arc;

    fn memory_logger() -> (Logger, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        let core = IoCore::new(
            Arc::new(JsonEncoder::new(EncoderConfig::production())),
            sink.clone(),
            LevelFilter::All,
        );
        (Logger::new(Arc::new(core), LevelGate::new(Level::Debug)), sink)
    }

    #[test]
    fn test_format_macros() {
        let (logger, sink) = memory_logger();
        let user = "alice";

        debug!(logger, "debug {}", 1);
        info!(logger, "user {} logged in", user);
        warn!(logger, "plain");
        error!(logger, "{:>5}", 42);

        let records = sink.json_lines();
        assert_eq!(records.len(), 4);
        assert_eq!(records[0]["msg"], "debug 1");
        assert_eq!(records[1]["msg"], "user alice logged in");
        assert_eq!(records[2]["msg"], "plain");
        assert_eq!(records[3]["msg"], "   42");
        assert_eq!(records[3]["level"], "error");
    }

    #[test]
    fn test_field_macros() {
        let (logger, sink) = memory_logger();
        info!(
            logger,
            "user logged in";
            "user_id" => 12345,
            "username" => "alice",
            "admin" => false
        );

        let record = &sink.json_lines()[0];
        assert_eq!(record["msg"], "user logged in");
        assert_eq!(record["user_id"], 12345);
        assert_eq!(record["username"], "alice");
        assert_eq!(record["admin"], false);
    }

    #[test]
    fn test_macro_caller_is_invocation_site() {
        let (logger, sink) = memory_logger();
        let line = line!() + 1;
        warn!(logger, "where");

        let caller = sink.json_lines()[0]["caller"].as_str().unwrap().to_string();
        assert!(caller.ends_with(&format!("macros.rs:{}", line)), "{}", caller);
    }
}
