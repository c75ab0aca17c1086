use crate::log::encoder::Encoder;
use crate::log::error::Result;
use crate::log::level::{Level, LevelFilter, LevelGate};
use crate::log::log_record::LogRecord;
use crate::log::sink::WriteSink;
use std::sync::Arc;

/// 路由单元
///
/// 一个 Core 由级别规则、编码器和输出端组成；Logger 把记录交给 Core，
/// Core 自行决定是否接受
pub trait Core: Send + Sync {
    /// 是否接受该级别的记录
    fn enabled(&self, level: Level) -> bool;

    /// 写入一条记录；调用方保证已经过 enabled 检查
    fn write(&self, record: &LogRecord) -> Result<()>;

    /// 刷新底层输出端
    fn sync(&self) -> Result<()>;

    /// 检查后写入
    fn check_write(&self, record: &LogRecord) -> Result<()> {
        if self.enabled(record.level) {
            self.write(record)
        } else {
            Ok(())
        }
    }
}

/// 编码器 + 输出端 + 级别规则
pub struct IoCore {
    encoder: Arc<dyn Encoder>,
    sink: Arc<dyn WriteSink>,
    filter: LevelFilter,
    gate: Option<LevelGate>,
}

impl IoCore {
    pub fn new(encoder: Arc<dyn Encoder>, sink: Arc<dyn WriteSink>, filter: LevelFilter) -> Self {
        Self {
            encoder,
            sink,
            filter,
            gate: None,
        }
    }

    /// 额外受共享阈值约束
    pub fn with_gate(mut self, gate: LevelGate) -> Self {
        self.gate = Some(gate);
        self
    }
}

impl Core for IoCore {
    fn enabled(&self, level: Level) -> bool {
        self.filter.matches(level) && self.gate.as_ref().map_or(true, |g| g.enabled(level))
    }

    fn write(&self, record: &LogRecord) -> Result<()> {
        let buf = self.encoder.encode(record)?;
        self.sink.write(&buf)?;
        Ok(())
    }

    fn sync(&self) -> Result<()> {
        self.sink.sync()?;
        Ok(())
    }
}

/// 扇出
///
/// 按构造顺序把记录交给每一个 Core，各 Core 相互独立：
/// 一个 Core 拒绝或写入失败不影响其他 Core，返回遇到的第一个错误
pub struct Tee {
    cores: Vec<Arc<dyn Core>>,
}

impl Tee {
    pub fn new(cores: Vec<Arc<dyn Core>>) -> Self {
        Self { cores }
    }

    pub fn len(&self) -> usize {
        self.cores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cores.is_empty()
    }
}

impl Core for Tee {
    fn enabled(&self, level: Level) -> bool {
        self.cores.iter().any(|c| c.enabled(level))
    }

    fn write(&self, record: &LogRecord) -> Result<()> {
        let mut first_err = None;
        for core in &self.cores {
            if let Err(e) = core.check_write(record) {
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    fn sync(&self) -> Result<()> {
        let mut first_err = None;
        for core in &self.cores {
            if let Err(e) = core.sync() {
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::encoder::{EncoderConfig, JsonEncoder};
    use crate::log::sink::MemorySink;

    fn json() -> Arc<dyn Encoder> {
        Arc::new(JsonEncoder::new(EncoderConfig::production()))
    }

    #[test]
    fn test_io_core_filter() {
        let sink = Arc::new(MemorySink::new());
        let core = IoCore::new(json(), sink.clone(), LevelFilter::AtLeast(Level::Error));

        core.check_write(&LogRecord::new(Level::Warn, "dropped")).unwrap();
        core.check_write(&LogRecord::new(Level::Error, "kept")).unwrap();

        let lines = sink.json_lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["msg"], "kept");
    }

    #[test]
    fn test_io_core_gate() {
        let gate = LevelGate::new(Level::Warn);
        let sink = Arc::new(MemorySink::new());
        let core = IoCore::new(json(), sink.clone(), LevelFilter::Below(Level::Error))
            .with_gate(gate.clone());

        assert!(!core.enabled(Level::Info));
        assert!(core.enabled(Level::Warn));
        assert!(!core.enabled(Level::Error));

        gate.set_level(Level::Debug);
        assert!(core.enabled(Level::Info));
    }

    #[test]
    fn test_tee_routes_independently() {
        let info = Arc::new(MemorySink::new());
        let err = Arc::new(MemorySink::new());
        let tee = Tee::new(vec![
            Arc::new(IoCore::new(json(), info.clone(), LevelFilter::All)),
            Arc::new(IoCore::new(json(), err.clone(), LevelFilter::AtLeast(Level::Error))),
        ]);
        assert_eq!(tee.len(), 2);

        for level in [Level::Info, Level::Error] {
            tee.check_write(&LogRecord::new(level, level.as_str())).unwrap();
        }

        assert_eq!(info.lines().len(), 2);
        assert_eq!(err.lines().len(), 1);
        assert_eq!(err.json_lines()[0]["msg"], "error");
    }

    #[test]
    fn test_tee_failure_does_not_stop_other_cores() {
        let broken = Arc::new(MemorySink::new());
        broken.set_failing(true);
        let healthy = Arc::new(MemorySink::new());
        let tee = Tee::new(vec![
            Arc::new(IoCore::new(json(), broken.clone(), LevelFilter::All)),
            Arc::new(IoCore::new(json(), healthy.clone(), LevelFilter::All)),
        ]);

        assert!(tee.write(&LogRecord::new(Level::Info, "x")).is_err());
        assert_eq!(healthy.lines().len(), 1);

        assert!(tee.sync().is_err());
        assert_eq!(broken.sync_count(), 1);
        assert_eq!(healthy.sync_count(), 1);
    }
}
