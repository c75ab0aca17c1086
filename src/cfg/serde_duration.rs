use anyhow::{anyhow, Result};
use serde::{Deserialize, Deserializer, Serializer};
use std::time::Duration;

pub use serde_with::{serde_as, DeserializeAs, SerializeAs};

/// 人类可读的 Duration 序列化适配器
///
/// 用于配置中的采样窗口等字段，支持 "500ms"、"1s"、"1m30s"、"2d" 等写法
pub struct HumanDur;

impl SerializeAs<Duration> for HumanDur {
    fn serialize_as<S>(source: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format_duration(*source))
    }
}

impl<'de> DeserializeAs<'de, Duration> for HumanDur {
    fn deserialize_as<D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_duration(&s).map_err(serde::de::Error::custom)
    }
}

/// 单位 -> 纳秒
fn unit_nanos(unit: &str) -> Option<f64> {
    Some(match unit {
        "ns" => 1.0,
        "us" | "µs" | "μs" => 1e3,
        "ms" => 1e6,
        "s" => 1e9,
        "m" => 60.0 * 1e9,
        "h" => 3600.0 * 1e9,
        "d" => 86400.0 * 1e9,
        _ => return None,
    })
}

/// 解析时间字符串: "1h30m45s" -> Duration
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim().to_lowercase();
    if s.is_empty() {
        return Err(anyhow!("empty duration"));
    }

    let mut total_nanos = 0f64;
    let mut rest = s.as_str();
    while !rest.is_empty() {
        let num_end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if num_end == 0 {
            return Err(anyhow!("expected number in duration: {}", s));
        }
        let value: f64 = rest[..num_end]
            .parse()
            .map_err(|_| anyhow!("invalid number in duration: {}", &rest[..num_end]))?;
        rest = &rest[num_end..];

        let unit_end = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let unit = &rest[..unit_end];
        if unit.is_empty() {
            return Err(anyhow!("missing unit in duration: {}", s));
        }
        let scale = unit_nanos(unit).ok_or_else(|| anyhow!("unsupported duration unit: {}", unit))?;
        total_nanos += value * scale;
        rest = &rest[unit_end..];
    }

    Ok(Duration::from_nanos(total_nanos.round() as u64))
}

/// Duration 格式化为字符串: Duration -> "1h30m45s"
///
/// 不足一秒的部分按 ms/us/ns 中能整除的最大单位输出
pub fn format_duration(duration: Duration) -> String {
    if duration.is_zero() {
        return "0s".to_string();
    }

    let mut out = String::new();
    let mut secs = duration.as_secs();
    let nanos = duration.subsec_nanos();

    for (unit, size) in [("d", 86400u64), ("h", 3600), ("m", 60)] {
        if secs >= size {
            out.push_str(&format!("{}{}", secs / size, unit));
            secs %= size;
        }
    }

    if nanos == 0 {
        if secs > 0 {
            out.push_str(&format!("{}s", secs));
        }
    } else if nanos % 1_000_000 == 0 {
        out.push_str(&format!("{}ms", secs * 1000 + u64::from(nanos / 1_000_000)));
    } else if nanos % 1_000 == 0 {
        out.push_str(&format!("{}us", secs * 1_000_000 + u64::from(nanos / 1_000)));
    } else {
        out.push_str(&format!("{}ns", secs * 1_000_000_000 + u64::from(nanos)));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[test]
    fn test_parse_duration_units() {
        assert_eq!(parse_duration("1s").unwrap(), Duration::from_secs(1));
        assert_eq!(parse_duration("2m").unwrap(), Duration::from_secs(120));
        assert_eq!(parse_duration("1h").unwrap(), Duration::from_secs(3600));
        assert_eq!(parse_duration("1d").unwrap(), Duration::from_secs(86400));
        assert_eq!(parse_duration("100ms").unwrap(), Duration::from_millis(100));
        assert_eq!(parse_duration("1000us").unwrap(), Duration::from_micros(1000));
        assert_eq!(parse_duration("15ns").unwrap(), Duration::from_nanos(15));
    }

    #[test]
    fn test_parse_duration_compound_and_decimal() {
        assert_eq!(
            parse_duration("1h30m45s").unwrap(),
            Duration::from_secs(3600 + 1800 + 45)
        );
        assert_eq!(
            parse_duration("1m500ms").unwrap(),
            Duration::from_millis(60_500)
        );
        assert_eq!(parse_duration("1.5s").unwrap(), Duration::from_millis(1500));
        assert_eq!(parse_duration("  2S ").unwrap(), Duration::from_secs(2));
    }

    #[test]
    fn test_parse_duration_errors() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("s").is_err());
        assert!(parse_duration("10").is_err());
        assert!(parse_duration("10x").is_err());
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::ZERO), "0s");
        assert_eq!(format_duration(Duration::from_secs(5)), "5s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1m30s");
        assert_eq!(format_duration(Duration::from_secs(3600 + 1800 + 45)), "1h30m45s");
        assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1500ms");
        assert_eq!(format_duration(Duration::from_micros(3)), "3us");
    }

    #[test]
    fn test_human_dur_serde() {
        #[serde_as]
        #[derive(Debug, Serialize, Deserialize, PartialEq)]
        struct Window {
            #[serde_as(as = "HumanDur")]
            tick: Duration,
        }

        let w: Window = serde_json::from_str(r#"{"tick":"500ms"}"#).unwrap();
        assert_eq!(w.tick, Duration::from_millis(500));
        assert_eq!(serde_json::to_string(&w).unwrap(), r#"{"tick":"500ms"}"#);

        assert!(serde_json::from_str::<Window>(r#"{"tick":"soon"}"#).is_err());
    }
}
