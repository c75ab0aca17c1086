use crate::log::encoder::console_encoder::ConsoleEncoder;
use crate::log::encoder::core::{Encoder, EncoderConfig};
use crate::log::encoder::json_encoder::JsonEncoder;
use crate::log::error::{LogError, Result};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

type Constructor = Box<dyn Fn(EncoderConfig) -> Box<dyn Encoder> + Send + Sync>;

fn constructor<T>() -> Constructor
where
    T: Encoder + From<EncoderConfig> + 'static,
{
    Box::new(|config| Box::new(T::from(config)) as Box<dyn Encoder>)
}

/// 编码器注册表，预置 json 与 console
static REGISTRY: Lazy<RwLock<HashMap<String, Constructor>>> = Lazy::new(|| {
    let mut map = HashMap::new();
    map.insert("json".to_string(), constructor::<JsonEncoder>());
    map.insert("console".to_string(), constructor::<ConsoleEncoder>());
    RwLock::new(map)
});

/// 注册自定义编码器，同名覆盖
pub fn register_encoder<F>(name: &str, ctor: F)
where
    F: Fn(EncoderConfig) -> Box<dyn Encoder> + Send + Sync + 'static,
{
    let mut registry = REGISTRY.write().unwrap_or_else(|e| e.into_inner());
    registry.insert(name.to_string(), Box::new(ctor));
}

/// 检查编码格式名称是否已注册
pub fn is_registered(name: &str) -> bool {
    let registry = REGISTRY.read().unwrap_or_else(|e| e.into_inner());
    registry.contains_key(name)
}

/// 按名称创建编码器，未注册的名称返回 UnsupportedEncoding
pub fn create_encoder(name: &str, config: EncoderConfig) -> Result<Arc<dyn Encoder>> {
    let registry = REGISTRY.read().unwrap_or_else(|e| e.into_inner());
    let ctor = registry
        .get(name)
        .ok_or_else(|| LogError::UnsupportedEncoding(name.to_string()))?;
    Ok(Arc::from(ctor(config)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::level::Level;
    use crate::log::log_record::LogRecord;

    struct UpperEncoder;

    impl Encoder for UpperEncoder {
        fn encode(&self, record: &LogRecord) -> Result<Vec<u8>> {
            Ok(format!("{}\n", record.message.to_uppercase()).into_bytes())
        }
    }

    #[test]
    fn test_create_builtin_encoders() -> Result<()> {
        let record = LogRecord::new(Level::Info, "msg");
        for name in ["json", "console"] {
            let encoder = create_encoder(name, EncoderConfig::default())?;
            assert!(!encoder.encode(&record)?.is_empty());
        }
        Ok(())
    }

    #[test]
    fn test_create_unknown_encoder() {
        let err = create_encoder("xml", EncoderConfig::default()).err().unwrap();
        assert!(matches!(err, LogError::UnsupportedEncoding(ref n) if n == "xml"));
        assert!(!is_registered("xml"));
    }

    #[test]
    fn test_register_custom_encoder() -> Result<()> {
        register_encoder("upper", |_| Box::new(UpperEncoder));
        assert!(is_registered("upper"));

        let encoder = create_encoder("upper", EncoderConfig::default())?;
        let bytes = encoder.encode(&LogRecord::new(Level::Info, "shout"))?;
        assert_eq!(bytes, b"SHOUT\n");
        Ok(())
    }
}
