pub mod sample;
pub mod results;
pub mod tasks;

pub use sample::{Axes, IngestRequest, NewSample, RawReading, SensorSample, SensorType, GRAVITY};
pub use results::{AllRecords, RangeReport, SpeedSample, StoreStats};
pub use tasks::DatabaseTask;
