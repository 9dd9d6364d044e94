use chrono::{DateTime, Utc};
use log::debug;

use crate::database::SensorStore;
use crate::error::{Result, SpeedSenseError};
use crate::speed::estimate_speeds;
use crate::types::{AllRecords, RangeReport, SensorType};
use crate::utils::parse_timestamp;

pub fn list_all<S: SensorStore + ?Sized>(store: &S) -> Result<AllRecords> {
    Ok(AllRecords {
        accelerometer: store.list_all(SensorType::Accelerometer)?,
        gyroscope: store.list_all(SensorType::Gyroscope)?,
    })
}

/// 解析区间边界，缺失或格式错误都算 InvalidRange
pub fn parse_range(start: Option<&str>, end: Option<&str>) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let (start, end) = match (start, end) {
        (Some(s), Some(e)) if !s.trim().is_empty() && !e.trim().is_empty() => (s, e),
        _ => {
            return Err(SpeedSenseError::InvalidRange(
                "Start and end timestamps are required".to_string(),
            ))
        }
    };

    let parse = |raw: &str| {
        parse_timestamp(raw)
            .map_err(|_| SpeedSenseError::InvalidRange(format!("Invalid timestamp format: {}", raw)))
    };

    Ok((parse(start)?, parse(end)?))
}

pub fn query_range<S: SensorStore + ?Sized>(
    store: &S,
    start: Option<&str>,
    end: Option<&str>,
) -> Result<RangeReport> {
    let (start, end) = parse_range(start, end)?;

    let accelerometer = store.query_range(SensorType::Accelerometer, &start, &end)?;
    let gyroscope = store.query_range(SensorType::Gyroscope, &start, &end)?;

    // 位置 -> 记录 id 的对照表；缺失的模长按 0 处理，不会成为峰值
    let series: Vec<(i64, f64)> = accelerometer
        .iter()
        .map(|s| (s.id, s.axes.magnitude.unwrap_or(0.0)))
        .collect();
    let speeds = estimate_speeds(&series);

    debug!(
        "Range query returned {} accelerometer and {} gyroscope records",
        accelerometer.len(),
        gyroscope.len()
    );

    Ok(RangeReport {
        accelerometer,
        gyroscope,
        speeds,
    })
}
