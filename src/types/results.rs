use serde::Serialize;

use super::SensorSample;

/// 单条加速度记录的速度估计
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpeedSample {
    pub id: i64,
    pub speed: f64,
}

#[derive(Debug, Clone, Default)]
pub struct AllRecords {
    pub accelerometer: Vec<SensorSample>,
    pub gyroscope: Vec<SensorSample>,
}

/// 时间区间查询结果，`speeds` 与 `accelerometer` 一一对应
#[derive(Debug, Clone, Default)]
pub struct RangeReport {
    pub accelerometer: Vec<SensorSample>,
    pub gyroscope: Vec<SensorSample>,
    pub speeds: Vec<SpeedSample>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub accelerometer: usize,
    pub gyroscope: usize,
}

impl StoreStats {
    pub fn total(&self) -> usize {
        self.accelerometer + self.gyroscope
    }
}
