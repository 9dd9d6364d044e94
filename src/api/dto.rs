use serde::Serialize;

use crate::types::{AllRecords, RangeReport, SensorSample, SpeedSample};
use crate::utils::format_iso;

#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub status: &'static str,
    pub processed_count: usize,
}

impl IngestResponse {
    pub fn success(processed_count: usize) -> Self {
        Self {
            status: "success",
            processed_count,
        }
    }
}

/// `GET /get-data` 中的单条记录
#[derive(Debug, Serialize)]
pub struct FullRecord {
    pub id: i64,
    pub unique_timestamp: f64,
    pub timestamp: String,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
    pub magnitude: Option<f64>,
}

impl From<&SensorSample> for FullRecord {
    fn from(s: &SensorSample) -> Self {
        Self {
            id: s.id,
            unique_timestamp: s.sequence_key,
            timestamp: format_iso(&s.recorded_at),
            x: s.axes.x,
            y: s.axes.y,
            z: s.axes.z,
            magnitude: s.axes.magnitude,
        }
    }
}

/// 区间查询只返回数值字段
#[derive(Debug, Serialize)]
pub struct CompactRecord {
    pub id: i64,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
    pub magnitude: Option<f64>,
}

impl From<&SensorSample> for CompactRecord {
    fn from(s: &SensorSample) -> Self {
        Self {
            id: s.id,
            x: s.axes.x,
            y: s.axes.y,
            z: s.axes.z,
            magnitude: s.axes.magnitude,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AllDataResponse {
    pub gyroscope_data: Vec<FullRecord>,
    pub accelerometer_data: Vec<FullRecord>,
}

impl From<&AllRecords> for AllDataResponse {
    fn from(all: &AllRecords) -> Self {
        Self {
            gyroscope_data: all.gyroscope.iter().map(FullRecord::from).collect(),
            accelerometer_data: all.accelerometer.iter().map(FullRecord::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RangeResponse {
    pub accelerometer_data: Vec<CompactRecord>,
    pub gyroscope_data: Vec<CompactRecord>,
    pub speed_data: Vec<SpeedSample>,
}

impl From<RangeReport> for RangeResponse {
    fn from(report: RangeReport) -> Self {
        Self {
            accelerometer_data: report.accelerometer.iter().map(CompactRecord::from).collect(),
            gyroscope_data: report.gyroscope.iter().map(CompactRecord::from).collect(),
            speed_data: report.speeds,
        }
    }
}
