use crate::log::encoder::core::{Encoder, EncoderConfig};
use crate::log::error::Result;
use crate::log::level::Level;
use crate::log::log_record::{LogRecord, MetadataValue};
use colored::Colorize;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// 控制台编码器
///
/// 以制表符分隔：时间 级别 名称 位置 消息 {字段}，调用栈另起一行
pub struct ConsoleEncoder {
    config: EncoderConfig,
}

impl ConsoleEncoder {
    pub fn new(config: EncoderConfig) -> Self {
        Self { config }
    }

    fn level_tag(&self, record: &LogRecord) -> String {
        let text = self.config.level_text(record);
        if !self.config.colored {
            return text.to_string();
        }
        match record.level {
            Level::Debug => text.magenta().to_string(),
            Level::Info => text.blue().to_string(),
            Level::Warn => text.yellow().to_string(),
            Level::Error | Level::Panic | Level::Fatal => text.red().to_string(),
        }
    }
}

/// 字段按插入顺序编码为紧凑 JSON 对象
struct Fields<'a>(&'a [(String, MetadataValue)]);

impl Serialize for Fields<'_> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl Encoder for ConsoleEncoder {
    fn encode(&self, record: &LogRecord) -> Result<Vec<u8>> {
        let mut line = String::with_capacity(64 + record.message.len());

        line.push_str(&self.config.time_text(record));
        line.push('\t');
        line.push_str(&self.level_tag(record));
        if !record.logger.is_empty() {
            line.push('\t');
            line.push_str(&record.logger);
        }
        if let Some(caller) = &record.caller {
            line.push('\t');
            line.push_str(&caller.to_string());
        }
        line.push('\t');
        line.push_str(&record.message);

        if !record.fields.is_empty() {
            line.push('\t');
            line.push_str(&serde_json::to_string(&Fields(&record.fields))?);
        }

        if let Some(stack) = &record.stack {
            line.push('\n');
            line.push_str(stack.trim_end());
        }
        line.push('\n');

        Ok(line.into_bytes())
    }
}

crate::impl_from!(EncoderConfig => ConsoleEncoder);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::log_record::Caller;

    fn encode(config: EncoderConfig, record: &LogRecord) -> String {
        String::from_utf8(ConsoleEncoder::new(config).encode(record).unwrap()).unwrap()
    }

    #[test]
    fn test_console_encoder_format() {
        let record = LogRecord::new(Level::Info, "server started");
        let line = encode(EncoderConfig::production(), &record);
        println!("{}", line);

        let parts: Vec<&str> = line.trim_end().split('\t').collect();
        assert_eq!(parts.len(), 3);
        assert!(parts[0].contains('T'));
        assert!(parts[0].ends_with('Z'));
        assert_eq!(parts[1], "info");
        assert_eq!(parts[2], "server started");
    }

    #[test]
    fn test_console_encoder_with_name_caller_fields() {
        let record = LogRecord::new(Level::Error, "query failed")
            .with_logger("db")
            .with_caller(Caller::new("src/db.rs", 42))
            .with_field("table", "users")
            .with_field("ok", false);
        let line = encode(EncoderConfig::development(), &record);
        println!("{}", line);

        assert!(line.contains("\tERROR\tdb\tsrc/db.rs:42\tquery failed\t"));
        assert!(line.trim_end().ends_with(r#"{"table":"users","ok":false}"#));
    }

    #[test]
    fn test_console_encoder_stack_on_following_lines() {
        let record = LogRecord::new(Level::Warn, "careful").with_stack("0: main\n1: start\n");
        let line = encode(EncoderConfig::production(), &record);

        let lines: Vec<&str> = line.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with("careful"));
        assert_eq!(lines[1], "0: main");
        assert_eq!(lines[2], "1: start");
    }

    #[test]
    fn test_console_encoder_colored() {
        let record = LogRecord::new(Level::Error, "boom");
        let line = encode(EncoderConfig::development().with_colored(true), &record);
        println!("{}", line);

        assert!(line.contains("ERROR"));
        assert!(line.contains("boom"));
    }
}
