// Emit command implementation

use anyhow::{anyhow, Result};
use logx::log;
use logx::MetadataValue;

use crate::cli::EmitArgs;

/// 解析 key=value，value 优先按 JSON 解析
fn parse_field(raw: &str) -> Result<(String, MetadataValue)> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("invalid field, expected key=value: {}", raw))?;
    if key.is_empty() {
        return Err(anyhow!("invalid field, empty key: {}", raw));
    }
    let value = serde_json::from_str::<serde_json::Value>(value)
        .map(MetadataValue::from)
        .unwrap_or_else(|_| MetadataValue::from(value));
    Ok((key.to_string(), value))
}

/// Execute the emit command
pub fn execute_emit(args: &EmitArgs) -> Result<()> {
    let fields = args
        .fields
        .iter()
        .map(|f| parse_field(f))
        .collect::<Result<Vec<_>>>()?;

    let logger = match &args.name {
        Some(name) => log::named(name),
        None => log::logger(),
    };

    for _ in 0..args.count {
        logger.logm(args.level, args.message.as_str(), fields.iter().cloned());
    }

    log::flush();
    Ok(())
}
