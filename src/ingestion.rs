use log::{error, info, warn};

use crate::database::SensorStore;
use crate::error::{Result, SpeedSenseError};
use crate::sequencer::Sequencer;
use crate::types::{IngestRequest, NewSample, SensorType};
use crate::utils::{format_timestamp, parse_timestamp};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestOptions {
    /// 为 true 时，加速度记录缺少 x/y/z/magnitude 任一字段即拒绝整批
    pub require_accelerometer_fields: bool,
}

/// 校验通过、可以整批写入的数据
#[derive(Debug, Clone)]
pub struct PreparedBatch {
    pub sensor: SensorType,
    pub samples: Vec<NewSample>,
}

/// 校验请求、换算单位并分配排序键，不触碰存储
pub fn prepare_batch(request: &IngestRequest, options: &IngestOptions) -> Result<PreparedBatch> {
    let raw_sensor = request
        .sensor_type
        .as_deref()
        .ok_or_else(|| SpeedSenseError::InvalidPayload("sensor_type is required".to_string()))?;
    let readings = request
        .data
        .as_ref()
        .ok_or_else(|| SpeedSenseError::InvalidPayload("data is required".to_string()))?;
    let sensor = SensorType::parse(raw_sensor)?;

    if readings.is_empty() {
        return Ok(PreparedBatch {
            sensor,
            samples: Vec::new(),
        });
    }

    let raw_base = request
        .timestamp
        .as_deref()
        .ok_or_else(|| SpeedSenseError::InvalidPayload("timestamp is required".to_string()))?;
    let mut sequencer = Sequencer::anchored_at(raw_base)?;

    let strict = options.require_accelerometer_fields && sensor == SensorType::Accelerometer;
    let scale = sensor.unit_scale();

    let mut samples = Vec::with_capacity(readings.len());
    for (index, reading) in readings.iter().enumerate() {
        let raw_ts = reading.timestamp.as_deref().ok_or_else(|| {
            SpeedSenseError::InvalidPayload(format!("record {} is missing timestamp", index))
        })?;
        let recorded_at = parse_timestamp(raw_ts)
            .map_err(|_| SpeedSenseError::InvalidRecordTimestamp(raw_ts.to_string()))?;

        let axes = reading.axes();
        if strict {
            let missing = axes.missing_fields();
            if !missing.is_empty() {
                return Err(SpeedSenseError::InvalidPayload(format!(
                    "record {} is missing {}",
                    index,
                    missing.join(", ")
                )));
            }
        }

        samples.push(NewSample {
            sequence_key: sequencer.next_key(),
            recorded_at,
            axes: axes.scaled(scale),
        });
    }

    Ok(PreparedBatch { sensor, samples })
}

/// 处理一次上传：全部校验通过后一次性写入，返回处理条数
pub fn ingest<S: SensorStore + ?Sized>(
    store: &mut S,
    request: &IngestRequest,
    options: &IngestOptions,
) -> Result<usize> {
    let batch = match prepare_batch(request, options) {
        Ok(batch) => batch,
        Err(e) => {
            warn!("Rejected batch: {}", e);
            return Err(e);
        }
    };

    if batch.samples.is_empty() {
        info!("Empty {} batch, nothing to store", batch.sensor);
        return Ok(0);
    }

    let saved = store
        .insert_batch(batch.sensor, &batch.samples)
        .map_err(|e| {
            error!("Failed to store {} batch: {}", batch.sensor, e);
            e
        })?;
    info!(
        "Ingested {} {} records from {} (anchor {})",
        saved,
        batch.sensor,
        request.device_id.as_deref().unwrap_or("unknown device"),
        format_timestamp(batch.samples[0].sequence_key)
    );
    Ok(saved)
}
