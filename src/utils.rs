use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};

use crate::error::{Result, SpeedSenseError};

const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f%:z", "%Y-%m-%dT%H:%M%:z"];
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// 宽松解析客户端时间戳
/// 先去掉所有空白字符，再把 `Z` 换成 `+00:00`，然后依次尝试:
/// 带时区的 ISO-8601、不带时区的日期时间(按 UTC)、纯日期(UTC 零点)
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    let cleaned: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    let cleaned = cleaned.replace('Z', "+00:00");

    if cleaned.is_empty() {
        return Err(SpeedSenseError::InvalidTimestamp(raw.to_string()));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(&cleaned) {
        return Ok(dt.with_timezone(&Utc));
    }

    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(&cleaned, fmt) {
            return Ok(dt.with_timezone(&Utc));
        }
    }

    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&cleaned, fmt) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(&cleaned, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }

    Err(SpeedSenseError::InvalidTimestamp(raw.to_string()))
}

/// 毫秒级 epoch 浮点值，保留亚毫秒部分
pub fn epoch_millis(dt: &DateTime<Utc>) -> f64 {
    dt.timestamp_micros() as f64 / 1000.0
}

pub fn to_micros(dt: &DateTime<Utc>) -> i64 {
    dt.timestamp_micros()
}

pub fn from_micros(us: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_micros(us).unwrap_or_default()
}

/// RFC 3339 输出，毫秒精度，UTC 用 `Z` 结尾
pub fn format_iso(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// 将毫秒时间戳格式化为 HH:MM:SS.mmm，用于日志
pub fn format_timestamp(timestamp_ms: f64) -> String {
    match DateTime::<Utc>::from_timestamp_millis(timestamp_ms as i64) {
        Some(dt) => dt.format("%H:%M:%S%.3f").to_string(),
        None => format!("Invalid timestamp: {}", timestamp_ms),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_zulu_suffix() {
        let dt = parse_timestamp("2024-03-01T10:15:30Z").unwrap();
        assert_eq!(dt.timestamp(), 1_709_288_130);
    }

    #[test]
    fn parses_fractional_seconds_and_offset() {
        let dt = parse_timestamp("2024-03-01T12:15:30.250+02:00").unwrap();
        assert_eq!(dt.timestamp_millis(), 1_709_288_130_250);
        assert_eq!(epoch_millis(&dt), 1_709_288_130_250.0);
    }

    #[test]
    fn strips_embedded_whitespace() {
        let dt = parse_timestamp(" 2024-03-01T10:15:30 Z ").unwrap();
        assert_eq!(dt.timestamp(), 1_709_288_130);
    }

    #[test]
    fn offsetless_values_are_utc() {
        let a = parse_timestamp("2024-03-01T10:15:30").unwrap();
        let b = parse_timestamp("2024-03-01T10:15:30Z").unwrap();
        assert_eq!(a, b);

        let midnight = parse_timestamp("2024-03-01").unwrap();
        assert_eq!(format_iso(&midnight), "2024-03-01T00:00:00.000Z");
    }

    #[test]
    fn rejects_garbage_and_names_it() {
        let err = parse_timestamp("not-a-date").unwrap_err();
        assert_eq!(err, SpeedSenseError::InvalidTimestamp("not-a-date".to_string()));
        assert!(parse_timestamp("   ").is_err());
    }

    #[test]
    fn micros_roundtrip_keeps_precision() {
        let dt = parse_timestamp("2024-03-01T10:15:30.123456Z").unwrap();
        assert_eq!(from_micros(to_micros(&dt)), dt);
        assert_eq!(format_iso(&dt), "2024-03-01T10:15:30.123Z");
    }

    #[test]
    fn log_format_is_clock_time() {
        assert_eq!(format_timestamp(1_709_288_130_250.0), "10:15:30.250");
    }
}
