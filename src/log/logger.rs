use crate::log::core::Core;
use crate::log::level::{Level, LevelGate};
use crate::log::log_record::{Caller, LogRecord, MetadataValue};
use crate::log::sink::{ConsoleSink, WriteSink};
use crate::log::terminator::{ProcessTerminator, Terminator};
use chrono::{SecondsFormat, Utc};
use std::backtrace::Backtrace;
use std::fmt;
use std::panic::Location;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Weak};

/// 调用栈中属于日志系统自身的帧
const INTERNAL_FRAMES: [&str; 3] = [
    "std::backtrace",
    concat!(env!("CARGO_PKG_NAME"), "::log::logger::"),
    concat!(env!("CARGO_PKG_NAME"), "::log::global::"),
];

/// 日志器
///
/// 一个根 Logger 及其派生出的所有子 Logger 共享同一个 [`LevelGate`] 和同一组 Core。
/// 子 Logger 通过 [`Logger::named`] / [`Logger::with_fields`] 派生，父节点以弱引用记录子节点，
/// 仅用于 [`Logger::flush`] 的级联刷新。
///
/// # 示例
///
/// ```ignore
/// let logger = logx::log::build(&LogConfig::default())?;
/// let db = logger.named("db");
/// db.infom("query done", [("rows", 12.into())]);
/// db.warnf(format_args!("slow query: {}ms", 1500));
/// logger.flush();
/// ```
pub struct Logger {
    name: String,
    core: Arc<dyn Core>,
    gate: LevelGate,
    caller_skip: AtomicUsize,
    add_caller: bool,
    stack_level: Option<Level>,
    fields: Arc<Vec<(String, MetadataValue)>>,
    error_output: Arc<dyn WriteSink>,
    terminator: Arc<dyn Terminator>,
    children: Mutex<Vec<Weak<Logger>>>,
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("level", &self.gate.level())
            .field("caller_skip", &self.caller_skip())
            .field("stack_level", &self.stack_level)
            .finish()
    }
}

impl Logger {
    /// 以给定的 Core 和阈值创建根 Logger
    ///
    /// 默认记录调用位置、不采集调用栈、写入错误报告到 stderr、使用 [`ProcessTerminator`]
    pub fn new(core: Arc<dyn Core>, gate: LevelGate) -> Self {
        Self {
            name: String::new(),
            core,
            gate,
            caller_skip: AtomicUsize::new(0),
            add_caller: true,
            stack_level: None,
            fields: Arc::new(Vec::new()),
            error_output: Arc::new(ConsoleSink::stderr()),
            terminator: Arc::new(ProcessTerminator),
            children: Mutex::new(Vec::new()),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// 是否在记录中附加调用位置
    pub fn with_caller(mut self, add_caller: bool) -> Self {
        self.add_caller = add_caller;
        self
    }

    /// 级别达到 level 时采集调用栈，None 表示不采集
    pub fn with_stack_level(mut self, level: Option<Level>) -> Self {
        self.stack_level = level;
        self
    }

    pub fn with_initial_fields(
        mut self,
        fields: impl IntoIterator<Item = (impl Into<String>, MetadataValue)>,
    ) -> Self {
        self.fields = Arc::new(fields.into_iter().map(|(k, v)| (k.into(), v)).collect());
        self
    }

    /// 写入失败时的报告目标
    pub fn with_error_output(mut self, sink: Arc<dyn WriteSink>) -> Self {
        self.error_output = sink;
        self
    }

    pub fn with_terminator(mut self, terminator: Arc<dyn Terminator>) -> Self {
        self.terminator = terminator;
        self
    }

    /// 以 "." 连接的完整名称，根 Logger 为空
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn level(&self) -> Level {
        self.gate.level()
    }

    /// 修改共享阈值，对根节点及所有派生节点同时生效
    pub fn set_level(&self, level: Level) {
        self.gate.set_level(level);
    }

    pub fn gate(&self) -> &LevelGate {
        &self.gate
    }

    pub fn enabled(&self, level: Level) -> bool {
        self.gate.enabled(level) && self.core.enabled(level)
    }

    pub fn caller_skip(&self) -> usize {
        self.caller_skip.load(Ordering::Relaxed)
    }

    /// 增加本节点的调用栈跳过帧数，不影响已派生的子节点
    pub fn add_caller_skip(&self, skip: usize) {
        self.caller_skip.fetch_add(skip, Ordering::Relaxed);
    }

    fn derive(&self, name: String, fields: Arc<Vec<(String, MetadataValue)>>) -> Arc<Logger> {
        let child = Arc::new(Logger {
            name,
            core: self.core.clone(),
            gate: self.gate.clone(),
            caller_skip: AtomicUsize::new(self.caller_skip()),
            add_caller: self.add_caller,
            stack_level: self.stack_level,
            fields,
            error_output: self.error_output.clone(),
            terminator: self.terminator.clone(),
            children: Mutex::new(Vec::new()),
        });

        let mut children = self.children.lock().unwrap_or_else(|e| e.into_inner());
        children.retain(|c| c.strong_count() > 0);
        children.push(Arc::downgrade(&child));
        child
    }

    /// 派生子 Logger，名称为 `<父名称>.<name>`
    pub fn named(&self, name: &str) -> Arc<Logger> {
        let full = match (self.name.is_empty(), name.is_empty()) {
            (true, _) => name.to_string(),
            (false, true) => self.name.clone(),
            (false, false) => format!("{}.{}", self.name, name),
        };
        self.derive(full, self.fields.clone())
    }

    /// 派生携带额外字段的子 Logger
    pub fn with_fields(
        &self,
        fields: impl IntoIterator<Item = (impl Into<String>, MetadataValue)>,
    ) -> Arc<Logger> {
        let mut merged = self.fields.as_ref().clone();
        merged.extend(fields.into_iter().map(|(k, v)| (k.into(), v)));
        self.derive(self.name.clone(), Arc::new(merged))
    }

    /// 当前仍存活的子节点数
    pub fn children_count(&self) -> usize {
        let children = self.children.lock().unwrap_or_else(|e| e.into_inner());
        children.iter().filter(|c| c.strong_count() > 0).count()
    }

    /// 刷新本节点的输出端，然后深度优先刷新所有子节点，错误被忽略
    pub fn flush(&self) {
        let _ = self.core.sync();

        let children: Vec<Arc<Logger>> = {
            let mut children = self.children.lock().unwrap_or_else(|e| e.into_inner());
            children.retain(|c| c.strong_count() > 0);
            children.iter().filter_map(Weak::upgrade).collect()
        };
        for child in children {
            child.flush();
        }
    }

    fn capture_stack(&self) -> String {
        trim_frames(&Backtrace::force_capture().to_string(), self.caller_skip())
    }

    fn report(&self, err: impl fmt::Display) {
        let line = format!(
            "{} write error: {}\n",
            Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            err
        );
        let _ = self.error_output.write(line.as_bytes());
        let _ = self.error_output.sync();
    }

    fn emit(
        &self,
        level: Level,
        message: String,
        fields: Vec<(String, MetadataValue)>,
        caller: Caller,
    ) {
        let mut record = LogRecord::new(level, message).with_logger(self.name.clone());
        record.fields = Vec::with_capacity(self.fields.len() + fields.len());
        record.fields.extend(self.fields.iter().cloned());
        record.fields.extend(fields);

        if self.add_caller {
            record.caller = Some(caller);
        }
        if self.stack_level.map_or(false, |l| level >= l) {
            record.stack = Some(self.capture_stack());
        }

        if let Err(e) = self.core.check_write(&record) {
            self.report(e);
        }
    }

    fn terminate(&self, level: Level, message: &str) -> ! {
        self.flush();
        match level {
            Level::Fatal => self.terminator.exit(1),
            _ => self.terminator.panic(message),
        }
    }

    /// 以显式的调用位置记录，供适配层使用
    pub fn log_with_caller(
        &self,
        level: Level,
        message: impl Into<String>,
        fields: Vec<(String, MetadataValue)>,
        caller: Caller,
    ) {
        if !self.gate.enabled(level) {
            if level.is_terminal() {
                let message: String = message.into();
                self.terminate(level, &message);
            }
            return;
        }
        let message: String = message.into();
        self.emit(level, message.clone(), fields, caller);
        if level.is_terminal() {
            self.terminate(level, &message);
        }
    }

    /// 按级别记录；panic / fatal 级别记录后不会返回
    #[track_caller]
    pub fn log(&self, level: Level, message: impl Into<String>) {
        self.log_with_caller(level, message, Vec::new(), Location::caller().into());
    }

    /// 按级别记录，延迟格式化
    #[track_caller]
    pub fn logf(&self, level: Level, args: fmt::Arguments<'_>) {
        let caller = Location::caller().into();
        if !self.gate.enabled(level) {
            if level.is_terminal() {
                self.terminate(level, &args.to_string());
            }
            return;
        }
        self.log_with_caller(level, args.to_string(), Vec::new(), caller);
    }

    /// 按级别记录带字段的日志
    ///
    /// ```ignore
    /// logger.logm(Level::Info, "user logged in", [
    ///     ("user_id", 12345.into()),
    ///     ("username", "alice".into()),
    /// ]);
    /// ```
    #[track_caller]
    pub fn logm(
        &self,
        level: Level,
        message: impl Into<String>,
        fields: impl IntoIterator<Item = (impl Into<String>, MetadataValue)>,
    ) {
        let caller = Location::caller().into();
        if !self.gate.enabled(level) {
            if level.is_terminal() {
                let message: String = message.into();
                self.terminate(level, &message);
            }
            return;
        }
        let fields = fields.into_iter().map(|(k, v)| (k.into(), v)).collect();
        self.log_with_caller(level, message, fields, caller);
    }

    #[track_caller]
    pub fn debug(&self, message: impl Into<String>) {
        self.log(Level::Debug, message)
    }

    #[track_caller]
    pub fn info(&self, message: impl Into<String>) {
        self.log(Level::Info, message)
    }

    #[track_caller]
    pub fn warn(&self, message: impl Into<String>) {
        self.log(Level::Warn, message)
    }

    #[track_caller]
    pub fn error(&self, message: impl Into<String>) {
        self.log(Level::Error, message)
    }

    /// 记录后刷新并触发 panic
    #[track_caller]
    pub fn panic(&self, message: impl Into<String>) -> ! {
        let message = message.into();
        self.log(Level::Panic, message.clone());
        self.terminate(Level::Panic, &message)
    }

    /// 记录后刷新并以状态码 1 退出
    #[track_caller]
    pub fn fatal(&self, message: impl Into<String>) -> ! {
        let message = message.into();
        self.log(Level::Fatal, message.clone());
        self.terminate(Level::Fatal, &message)
    }

    #[track_caller]
    pub fn debugf(&self, args: fmt::Arguments<'_>) {
        self.logf(Level::Debug, args)
    }

    #[track_caller]
    pub fn infof(&self, args: fmt::Arguments<'_>) {
        self.logf(Level::Info, args)
    }

    #[track_caller]
    pub fn warnf(&self, args: fmt::Arguments<'_>) {
        self.logf(Level::Warn, args)
    }

    #[track_caller]
    pub fn errorf(&self, args: fmt::Arguments<'_>) {
        self.logf(Level::Error, args)
    }

    #[track_caller]
    pub fn panicf(&self, args: fmt::Arguments<'_>) -> ! {
        self.panic(args.to_string())
    }

    #[track_caller]
    pub fn fatalf(&self, args: fmt::Arguments<'_>) -> ! {
        self.fatal(args.to_string())
    }

    #[track_caller]
    pub fn debugm(
        &self,
        message: impl Into<String>,
        fields: impl IntoIterator<Item = (impl Into<String>, MetadataValue)>,
    ) {
        self.logm(Level::Debug, message, fields)
    }

    #[track_caller]
    pub fn infom(
        &self,
        message: impl Into<String>,
        fields: impl IntoIterator<Item = (impl Into<String>, MetadataValue)>,
    ) {
        self.logm(Level::Info, message, fields)
    }

    #[track_caller]
    pub fn warnm(
        &self,
        message: impl Into<String>,
        fields: impl IntoIterator<Item = (impl Into<String>, MetadataValue)>,
    ) {
        self.logm(Level::Warn, message, fields)
    }

    #[track_caller]
    pub fn errorm(
        &self,
        message: impl Into<String>,
        fields: impl IntoIterator<Item = (impl Into<String>, MetadataValue)>,
    ) {
        self.logm(Level::Error, message, fields)
    }

    #[track_caller]
    pub fn panicm(
        &self,
        message: impl Into<String>,
        fields: impl IntoIterator<Item = (impl Into<String>, MetadataValue)>,
    ) -> ! {
        let message = message.into();
        self.logm(Level::Panic, message.clone(), fields);
        self.terminate(Level::Panic, &message)
    }

    #[track_caller]
    pub fn fatalm(
        &self,
        message: impl Into<String>,
        fields: impl IntoIterator<Item = (impl Into<String>, MetadataValue)>,
    ) -> ! {
        let message = message.into();
        self.logm(Level::Fatal, message.clone(), fields);
        self.terminate(Level::Fatal, &message)
    }
}

/// 去掉日志系统自身的栈帧，再额外跳过 skip 帧
fn trim_frames(raw: &str, skip: usize) -> String {
    let mut frames: Vec<Vec<&str>> = Vec::new();
    for line in raw.lines() {
        let trimmed = line.trim_start();
        let is_header = trimmed
            .split_once(": ")
            .map_or(false, |(n, _)| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()));
        match frames.last_mut() {
            Some(frame) if !is_header => frame.push(line),
            _ => frames.push(vec![line]),
        }
    }

    let symbol = |frame: &Vec<&str>| -> String {
        frame[0]
            .trim_start()
            .split_once(": ")
            .map(|(_, s)| s.trim_start_matches('<').to_string())
            .unwrap_or_default()
    };
    let internal = frames
        .iter()
        .take_while(|f| {
            let s = symbol(f);
            INTERNAL_FRAMES.iter().any(|p| s.starts_with(p))
        })
        .count();

    frames
        .iter()
        .skip(internal + skip)
        .flat_map(|f| f.iter().copied())
        .collect::<Vec<&str>>()
        .join("\n")
}
