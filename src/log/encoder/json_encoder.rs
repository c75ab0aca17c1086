use crate::log::encoder::core::{Encoder, EncoderConfig};
use crate::log::error::Result;
use crate::log::log_record::LogRecord;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// JSON 编码器
///
/// 每条记录一行 JSON，键顺序：时间、级别、名称、位置、消息、字段、调用栈
pub struct JsonEncoder {
    config: EncoderConfig,
}

impl JsonEncoder {
    pub fn new(config: EncoderConfig) -> Self {
        Self { config }
    }
}

struct JsonLine<'a> {
    record: &'a LogRecord,
    config: &'a EncoderConfig,
}

impl Serialize for JsonLine<'_> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let record = self.record;
        let config = self.config;

        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry(&config.time_key, &config.time_text(record))?;
        map.serialize_entry(&config.level_key, config.level_text(record))?;
        if !record.logger.is_empty() {
            map.serialize_entry(&config.name_key, &record.logger)?;
        }
        if let Some(caller) = &record.caller {
            map.serialize_entry(&config.caller_key, &caller.to_string())?;
        }
        map.serialize_entry(&config.message_key, &record.message)?;
        for (key, value) in &record.fields {
            map.serialize_entry(key, value)?;
        }
        if let Some(stack) = &record.stack {
            map.serialize_entry(&config.stacktrace_key, stack)?;
        }
        map.end()
    }
}

impl Encoder for JsonEncoder {
    fn encode(&self, record: &LogRecord) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(128 + record.message.len());
        serde_json::to_writer(
            &mut buf,
            &JsonLine {
                record,
                config: &self.config,
            },
        )?;
        buf.push(b'\n');
        Ok(buf)
    }
}

crate::impl_from!(EncoderConfig => JsonEncoder);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::level::Level;
    use crate::log::log_record::Caller;
    use chrono::{DateTime, Utc};
    use serde_json::Value;
    use std::time::Duration;

    fn encode(record: &LogRecord) -> Value {
        let encoder = JsonEncoder::new(EncoderConfig::production());
        let bytes = encoder.encode(record).unwrap();
        assert_eq!(bytes.last(), Some(&b'\n'));
        assert_eq!(bytes.iter().filter(|b| **b == b'\n').count(), 1);
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_json_encoder_round_trip() {
        let record = LogRecord::new(Level::Warn, "disk almost full");
        let value = encode(&record);

        assert_eq!(value["level"], "warn");
        assert_eq!(value["msg"], "disk almost full");
        let ts = DateTime::parse_from_rfc3339(value["ts"].as_str().unwrap())
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(
            ts.timestamp_millis(),
            record.timestamp.timestamp_millis()
        );
        assert_eq!(value["level"].as_str().unwrap().parse::<Level>().unwrap(), record.level);
    }

    #[test]
    fn test_json_encoder_optional_keys_omitted() {
        let value = encode(&LogRecord::new(Level::Info, "plain"));
        let obj = value.as_object().unwrap();
        assert!(!obj.contains_key("logger"));
        assert!(!obj.contains_key("caller"));
        assert!(!obj.contains_key("stacktrace"));
    }

    #[test]
    fn test_json_encoder_full_record() {
        let record = LogRecord::new(Level::Error, "query failed")
            .with_logger("db.raw")
            .with_caller(Caller::new("src/db.rs", 7))
            .with_stack("frame 0\nframe 1")
            .with_field("elapsed", Duration::from_secs(90))
            .with_field("retries", 3);
        let value = encode(&record);

        assert_eq!(value["logger"], "db.raw");
        assert_eq!(value["caller"], "src/db.rs:7");
        assert_eq!(value["elapsed"], "1m30s");
        assert_eq!(value["retries"], 3);
        assert_eq!(value["stacktrace"], "frame 0\nframe 1");
    }

    #[test]
    fn test_json_encoder_key_order_is_stable() {
        let record = LogRecord::new(Level::Info, "ordered")
            .with_logger("svc")
            .with_field("z", 1)
            .with_field("a", 2);
        let encoder = JsonEncoder::new(EncoderConfig::production());
        let line = String::from_utf8(encoder.encode(&record).unwrap()).unwrap();

        let keys = ["\"ts\"", "\"level\"", "\"logger\"", "\"msg\"", "\"z\"", "\"a\""];
        let positions: Vec<usize> = keys.iter().map(|k| line.find(k).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{}", line);
    }

    #[test]
    fn test_json_encoder_custom_keys_and_capital_level() {
        let config = EncoderConfig {
            message_key: "message".to_string(),
            ..EncoderConfig::development()
        };
        let encoder = JsonEncoder::from(config);
        let bytes = encoder.encode(&LogRecord::new(Level::Debug, "hi")).unwrap();
        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["message"], "hi");
        assert_eq!(value["level"], "DEBUG");
    }
}
