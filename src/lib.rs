//! SpeedSense: 运动传感器数据采集与速度估计服务
//!
//! 手表端按批上传加速度计/陀螺仪读数，服务端为每条记录分配唯一排序键后入库；
//! 区间查询时对加速度模长做峰值检测，估算每个峰值处的速度。

pub mod api;
pub mod config;
pub mod database;
pub mod error;
pub mod ingestion;
pub mod logger;
pub mod query;
pub mod sequencer;
pub mod speed;
pub mod types;
pub mod utils;

pub use error::{Result, SpeedSenseError};
pub use types::{SensorSample, SensorType, SpeedSample};
