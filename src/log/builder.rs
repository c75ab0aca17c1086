use crate::log::config::LogConfig;
use crate::log::core::{Core, IoCore, Tee};
use crate::log::encoder::{create_encoder, Encoder, EncoderConfig};
use crate::log::error::Result;
use crate::log::level::{Level, LevelFilter, LevelGate};
use crate::log::log_record::MetadataValue;
use crate::log::logger::Logger;
use crate::log::sampler::Sampler;
use crate::log::sink::{open_sink, ConsoleSink, RollingFileSinkConfig, Target, WriteSink};
use std::sync::Arc;

/// 按配置构建根 Logger
///
/// output 中的目标接收 error 以下的记录，err_output 中的目标接收 error 及以上的记录。
/// 任何一步失败都不会产生可用的 Logger。
pub fn build(config: &LogConfig) -> Result<Logger> {
    build_with(config, open_sink)
}

/// 与 [`build`] 相同，但由 open 负责把目标字符串转换为输出端
pub fn build_with<F>(config: &LogConfig, mut open: F) -> Result<Logger>
where
    F: FnMut(&str, &RollingFileSinkConfig) -> Result<Arc<dyn WriteSink>>,
{
    config.check()?;
    let level = config.parse_level()?;
    let gate = LevelGate::new(level);

    let base = config
        .mode
        .encoder_config()
        .with_local_time(config.local_time);
    let plain = create_encoder(&config.format, base.clone())?;
    let colored = if config.format == "console" {
        Some(create_encoder(&config.format, base.with_colored(true))?)
    } else {
        None
    };
    let encoder_for = |destination: &str| -> Arc<dyn Encoder> {
        match (&colored, Target::parse(destination)) {
            (Some(colored), Some(target)) if target.is_terminal() => colored.clone(),
            _ => plain.clone(),
        }
    };

    let rotation = config.rotation();
    let (output, err_output) = config.destinations();

    let mut cores: Vec<Arc<dyn Core>> = Vec::with_capacity(output.len() + err_output.len());
    for destination in &output {
        let sink = open(destination, &rotation)?;
        cores.push(Arc::new(
            IoCore::new(encoder_for(destination), sink, LevelFilter::Below(Level::Error))
                .with_gate(gate.clone()),
        ));
    }
    for destination in &err_output {
        let sink = open(destination, &rotation)?;
        cores.push(Arc::new(
            IoCore::new(encoder_for(destination), sink, LevelFilter::AtLeast(Level::Error))
                .with_gate(gate.clone()),
        ));
    }

    let mut core: Arc<dyn Core> = Arc::new(Tee::new(cores));
    if let Some(sampling) = &config.sampling {
        core = Arc::new(Sampler::new(core, sampling.clone()));
    }

    let fields = config
        .initial_fields
        .iter()
        .map(|(k, v)| (k.clone(), MetadataValue::from(v.clone())));

    Ok(Logger::new(core, gate)
        .with_caller(config.caller)
        .with_stack_level(config.stack_level())
        .with_initial_fields(fields))
}

/// 固定策略的 Logger：JSON 编码，恰好为 info 的记录写 stdout，error 及以上写 stderr，
/// 不记录调用位置和调用栈
pub fn console_pair(level: Level, encoder: EncoderConfig) -> Logger {
    console_pair_with(
        level,
        encoder,
        Arc::new(ConsoleSink::stdout()),
        Arc::new(ConsoleSink::stderr()),
    )
}

pub(crate) fn console_pair_with(
    level: Level,
    encoder: EncoderConfig,
    stdout: Arc<dyn WriteSink>,
    stderr: Arc<dyn WriteSink>,
) -> Logger {
    let gate = LevelGate::new(level);
    let encoder: Arc<dyn Encoder> = Arc::new(crate::log::encoder::JsonEncoder::new(encoder));
    let core = Tee::new(vec![
        Arc::new(
            IoCore::new(encoder.clone(), stdout, LevelFilter::Equals(Level::Info))
                .with_gate(gate.clone()),
        ),
        Arc::new(
            IoCore::new(encoder, stderr, LevelFilter::AtLeast(Level::Error))
                .with_gate(gate.clone()),
        ),
    ]);
    Logger::new(Arc::new(core), gate)
        .with_caller(false)
        .with_stack_level(None)
}
