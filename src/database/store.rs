use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::types::{NewSample, SensorSample, SensorType, StoreStats};

/// 两条只追加的数据流(加速度计/陀螺仪)的存储接口
///
/// `insert_batch` 必须是原子的：要么整批写入，要么一条都不写。
/// 读取按写入顺序返回。
pub trait SensorStore {
    fn insert_batch(&mut self, sensor: SensorType, samples: &[NewSample]) -> Result<usize>;

    fn list_all(&self, sensor: SensorType) -> Result<Vec<SensorSample>>;

    /// 闭区间 `[start, end]`，按 recorded_at 过滤
    fn query_range(
        &self,
        sensor: SensorType,
        start: &DateTime<Utc>,
        end: &DateTime<Utc>,
    ) -> Result<Vec<SensorSample>>;

    fn count(&self, sensor: SensorType) -> Result<usize>;

    fn stats(&self) -> Result<StoreStats> {
        Ok(StoreStats {
            accelerometer: self.count(SensorType::Accelerometer)?,
            gyroscope: self.count(SensorType::Gyroscope)?,
        })
    }
}
