use crate::cfg::serde_duration::{serde_as, HumanDur};
use crate::log::core::Core;
use crate::log::error::{LogError, Result};
use crate::log::level::Level;
use crate::log::log_record::{Caller, LogRecord};
use dashmap::DashMap;
use garde::Validate;
use serde::{Deserialize, Serialize};
use smart_default::SmartDefault;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// 采样配置
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, SmartDefault, Validate)]
#[serde(default)]
pub struct SamplerConfig {
    /// 每个窗口内原样输出的前 N 条
    #[default = 100]
    #[garde(range(min = 1))]
    pub initial: u64,

    /// 超过 initial 后每 thereafter 条输出一条，0 表示全部丢弃
    #[default = 100]
    #[garde(skip)]
    pub thereafter: u64,

    /// 窗口长度
    #[serde_as(as = "HumanDur")]
    #[default(Duration::from_secs(1))]
    #[garde(skip)]
    pub tick: Duration,

    /// 窗口结束后是否输出一条 "N messages skipped" 汇总记录
    #[default = true]
    #[garde(skip)]
    pub summary: bool,
}

/// 单调时钟
pub trait Clock: Send + Sync {
    /// 自任意固定起点以来经过的时长
    fn now(&self) -> Duration;
}

/// 基于 Instant 的系统时钟
pub struct SystemClock {
    origin: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SampleKey {
    level: Level,
    message: String,
    caller: Option<String>,
}

struct Counter {
    window_start: Duration,
    count: u64,
    skipped: u64,
    logger: String,
    caller: Option<Caller>,
}

impl Counter {
    fn expired(&self, now: Duration, tick: Duration) -> bool {
        now.saturating_sub(self.window_start) >= tick
    }
}

/// 采样包装
///
/// 以 (级别, 消息, 调用位置) 为键计数，每个窗口内前 initial 条原样通过，
/// 之后每 thereafter 条通过一条，其余丢弃并在窗口结束时汇总。
/// 每跨过一个窗口，写入时顺带清理已结束窗口的计数并输出汇总，计数表大小不超过两个窗口内的不同键数
pub struct Sampler {
    inner: Arc<dyn Core>,
    config: SamplerConfig,
    clock: Arc<dyn Clock>,
    counters: DashMap<SampleKey, Counter>,
    /// 上次清理的时刻（纳秒）
    last_sweep: AtomicU64,
}

impl Sampler {
    pub fn new(inner: Arc<dyn Core>, config: SamplerConfig) -> Self {
        Self::with_clock(inner, config, Arc::new(SystemClock::default()))
    }

    pub fn with_clock(inner: Arc<dyn Core>, config: SamplerConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner,
            config,
            clock,
            counters: DashMap::new(),
            last_sweep: AtomicU64::new(0),
        }
    }

    fn summary_record(&self, key: &SampleKey, counter: &Counter, skipped: u64) -> LogRecord {
        let mut record = LogRecord::new(key.level, format!("{} messages skipped", skipped))
            .with_logger(counter.logger.clone())
            .with_field("sampled", key.message.clone())
            .with_field("skipped", skipped);
        if let Some(caller) = &counter.caller {
            record = record.with_caller(caller.clone());
        }
        record
    }

    /// 是否通过；若上一个窗口有被丢弃的记录，返回其汇总
    fn sample(&self, record: &LogRecord, now: Duration) -> (bool, Option<LogRecord>) {
        let key = SampleKey {
            level: record.level,
            message: record.message.clone(),
            caller: record.caller.as_ref().map(|c| c.to_string()),
        };

        let mut counter = self.counters.entry(key.clone()).or_insert_with(|| Counter {
            window_start: now,
            count: 0,
            skipped: 0,
            logger: record.logger.clone(),
            caller: record.caller.clone(),
        });

        let mut summary = None;
        if counter.expired(now, self.config.tick) {
            if counter.skipped > 0 && self.config.summary {
                summary = Some(self.summary_record(&key, &counter, counter.skipped));
            }
            counter.window_start = now;
            counter.count = 0;
            counter.skipped = 0;
        }

        counter.count += 1;
        let n = counter.count;
        let initial = self.config.initial;
        let thereafter = self.config.thereafter;
        let pass = n <= initial || (thereafter > 0 && (n - initial) % thereafter == 0);
        if !pass {
            counter.skipped += 1;
        }

        (pass, summary)
    }

    /// 移除已结束窗口的计数，返回其中有丢弃记录的汇总
    fn sweep(&self, now: Duration) -> Vec<LogRecord> {
        let tick = self.config.tick;
        self.last_sweep.store(now.as_nanos() as u64, Ordering::Release);

        let mut summaries = Vec::new();
        self.counters.retain(|key, counter| {
            if !counter.expired(now, tick) {
                return true;
            }
            if counter.skipped > 0 && self.config.summary {
                summaries.push(self.summary_record(key, counter, counter.skipped));
            }
            false
        });
        summaries
    }

    /// 距上次清理已过一个窗口时清理，多个线程同时到达时只有一个执行
    fn sweep_if_due(&self, now: Duration) -> Vec<LogRecord> {
        let now_ns = now.as_nanos() as u64;
        let last = self.last_sweep.load(Ordering::Acquire);
        if now_ns.saturating_sub(last) < self.config.tick.as_nanos() as u64 {
            return Vec::new();
        }
        if self
            .last_sweep
            .compare_exchange(last, now_ns, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Vec::new();
        }
        self.sweep(now)
    }

    fn write_all(&self, records: &[LogRecord]) -> Option<LogError> {
        let mut first_err = None;
        for record in records {
            if let Err(e) = self.inner.check_write(record) {
                first_err.get_or_insert(e);
            }
        }
        first_err
    }
}

impl Core for Sampler {
    fn enabled(&self, level: Level) -> bool {
        self.inner.enabled(level)
    }

    fn write(&self, record: &LogRecord) -> Result<()> {
        let now = self.clock.now();
        let mut summaries = self.sweep_if_due(now);

        let (pass, summary) = self.sample(record, now);
        summaries.extend(summary);
        let mut first_err = self.write_all(&summaries);

        if pass {
            if let Err(e) = self.inner.write(record) {
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    /// 输出已结束窗口的汇总并清理过期计数，然后刷新内层
    fn sync(&self) -> Result<()> {
        let summaries = self.sweep(self.clock.now());
        let mut first_err = self.write_all(&summaries);
        if let Err(e) = self.inner.sync() {
            first_err.get_or_insert(e);
        }
        first_err.map_or(Ok(()), Err)
    }
}
