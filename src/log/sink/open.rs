use crate::log::error::{LogError, Result};
use crate::log::sink::{ConsoleSink, RollingFileSink, RollingFileSinkConfig, Target, WriteSink};
use std::sync::Arc;

/// 根据目标字符串打开输出端
///
/// "stdout" / "stderr" 对应终端输出端，其他字符串视为文件路径，
/// 使用 rotation 中的切分参数创建 RollingFileSink
pub fn open_sink(
    destination: &str,
    rotation: &RollingFileSinkConfig,
) -> Result<Arc<dyn WriteSink>> {
    if let Some(target) = Target::parse(destination) {
        return Ok(Arc::new(match target {
            Target::Stdout => ConsoleSink::stdout(),
            Target::Stderr => ConsoleSink::stderr(),
        }));
    }

    let config = RollingFileSinkConfig {
        filename: destination.to_string(),
        ..rotation.clone()
    };
    let sink = RollingFileSink::new(config).map_err(|source| LogError::SinkOpenFailed {
        path: destination.to_string(),
        source,
    })?;
    Ok(Arc::new(sink))
}

/// 依次打开多个目标，任意一个失败则整体失败
pub fn open_sinks(
    destinations: &[String],
    rotation: &RollingFileSinkConfig,
) -> Result<Vec<Arc<dyn WriteSink>>> {
    destinations
        .iter()
        .map(|d| open_sink(d, rotation))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use tempfile::TempDir;

    #[test]
    fn test_open_console_sinks() -> Result<()> {
        let rotation = RollingFileSinkConfig::default();
        let sink = open_sink("stdout", &rotation)?;
        sink.write(b"open_sink stdout\n")?;
        let sink = open_sink("stderr", &rotation)?;
        sink.write(b"open_sink stderr\n")?;
        Ok(())
    }

    #[test]
    fn test_open_file_sink() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("logs/info.log");
        let sink = open_sink(&path.to_string_lossy(), &RollingFileSinkConfig::default())?;
        sink.write(b"to file\n")?;
        sink.sync()?;
        assert_eq!(std::fs::read_to_string(&path)?, "to file\n");
        Ok(())
    }

    #[test]
    fn test_open_sink_failure() -> Result<()> {
        let dir = TempDir::new()?;
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "file")?;
        let path = blocker.join("app.log");

        let err = open_sink(&path.to_string_lossy(), &RollingFileSinkConfig::default())
            .err()
            .unwrap();
        println!("{}", err);
        assert!(matches!(err, LogError::SinkOpenFailed { .. }));
        assert!(err.is_config_error());
        Ok(())
    }

    #[test]
    fn test_open_sinks_all_or_nothing() -> Result<()> {
        let dir = TempDir::new()?;
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "file")?;

        let good = dir.path().join("ok.log").to_string_lossy().to_string();
        let bad = blocker.join("bad.log").to_string_lossy().to_string();
        let result = open_sinks(&[good, bad], &RollingFileSinkConfig::default());
        assert!(matches!(result, Err(LogError::SinkOpenFailed { .. })));
        Ok(())
    }
}
