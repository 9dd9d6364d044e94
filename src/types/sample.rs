use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SpeedSenseError};

/// 加速度计原始单位为 g，入库前换算成 m/s²
pub const GRAVITY: f64 = 9.81;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorType {
    Accelerometer,
    Gyroscope,
}

impl SensorType {
    pub const ALL: [SensorType; 2] = [SensorType::Accelerometer, SensorType::Gyroscope];

    pub fn parse(raw: &str) -> Result<Self> {
        match raw {
            "accelerometer" => Ok(SensorType::Accelerometer),
            "gyroscope" => Ok(SensorType::Gyroscope),
            other => Err(SpeedSenseError::UnknownSensorType(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SensorType::Accelerometer => "accelerometer",
            SensorType::Gyroscope => "gyroscope",
        }
    }

    pub fn table_name(&self) -> &'static str {
        match self {
            SensorType::Accelerometer => "accelerometer_data",
            SensorType::Gyroscope => "gyroscope_data",
        }
    }

    /// 陀螺仪数据原样保存
    pub fn unit_scale(&self) -> f64 {
        match self {
            SensorType::Accelerometer => GRAVITY,
            SensorType::Gyroscope => 1.0,
        }
    }
}

impl std::fmt::Display for SensorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 三轴读数加模长，任何一项都可能缺失
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Axes {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
    pub magnitude: Option<f64>,
}

impl Axes {
    /// 缺失的字段保持缺失，不补 0
    pub fn scaled(self, factor: f64) -> Self {
        Self {
            x: self.x.map(|v| v * factor),
            y: self.y.map(|v| v * factor),
            z: self.z.map(|v| v * factor),
            magnitude: self.magnitude.map(|v| v * factor),
        }
    }

    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.x.is_none() {
            missing.push("x");
        }
        if self.y.is_none() {
            missing.push("y");
        }
        if self.z.is_none() {
            missing.push("z");
        }
        if self.magnitude.is_none() {
            missing.push("magnitude");
        }
        missing
    }
}

/// 客户端上传的一条读数
#[derive(Deserialize, Clone, Debug, Default)]
pub struct RawReading {
    pub timestamp: Option<String>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
    pub magnitude: Option<f64>,
}

impl RawReading {
    pub fn axes(&self) -> Axes {
        Axes {
            x: self.x,
            y: self.y,
            z: self.z,
            magnitude: self.magnitude,
        }
    }
}

/// `POST /data` 的请求体
#[derive(Deserialize, Clone, Debug, Default)]
pub struct IngestRequest {
    pub sensor_type: Option<String>,
    pub timestamp: Option<String>,
    pub data: Option<Vec<RawReading>>,
    pub device_id: Option<String>,
}

/// 已完成校验、换算和排序键分配，等待写库
#[derive(Debug, Clone, PartialEq)]
pub struct NewSample {
    pub sequence_key: f64,
    pub recorded_at: DateTime<Utc>,
    pub axes: Axes,
}

/// 库中的一条记录
#[derive(Debug, Clone, PartialEq)]
pub struct SensorSample {
    pub id: i64,
    pub sequence_key: f64,
    pub recorded_at: DateTime<Utc>,
    pub axes: Axes,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sensor_type_parsing() {
        assert_eq!(SensorType::parse("accelerometer").unwrap(), SensorType::Accelerometer);
        assert_eq!(SensorType::parse("gyroscope").unwrap(), SensorType::Gyroscope);
        assert_eq!(
            SensorType::parse("magnetometer"),
            Err(SpeedSenseError::UnknownSensorType("magnetometer".to_string()))
        );
        // 大小写敏感
        assert!(SensorType::parse("Gyroscope").is_err());
    }

    #[test]
    fn scaling_keeps_absent_fields_absent() {
        let axes = Axes {
            x: Some(1.0),
            y: None,
            z: Some(-2.0),
            magnitude: None,
        };
        let scaled = axes.scaled(GRAVITY);
        assert_eq!(scaled.x, Some(9.81));
        assert_eq!(scaled.y, None);
        assert_eq!(scaled.z, Some(-19.62));
        assert_eq!(scaled.magnitude, None);
        assert_eq!(scaled.missing_fields(), vec!["y", "magnitude"]);
    }

    #[test]
    fn raw_reading_accepts_null_and_missing() {
        let reading: RawReading =
            serde_json::from_str(r#"{"timestamp":"2024-03-01T10:00:00Z","x":0.5,"y":null}"#).unwrap();
        assert_eq!(reading.x, Some(0.5));
        assert_eq!(reading.y, None);
        assert_eq!(reading.z, None);
        assert_eq!(reading.magnitude, None);
    }
}
