use thiserror::Error;

/// 统一的领域错误类型
/// 校验类错误在写库之前返回，保证批次不会部分提交
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpeedSenseError {
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
    #[error("Invalid timestamp format: {0}")]
    InvalidTimestamp(String),
    /// 批次内某条记录自身的时间戳无法解析
    #[error("Invalid timestamp format in record: {0}")]
    InvalidRecordTimestamp(String),
    #[error("Unknown sensor type: {0}")]
    UnknownSensorType(String),
    #[error("Invalid range: {0}")]
    InvalidRange(String),
    #[error("{0}")]
    StoreFailure(String),
}

impl SpeedSenseError {
    pub fn is_validation(&self) -> bool {
        !matches!(self, SpeedSenseError::StoreFailure(_))
    }
}

impl From<duckdb::Error> for SpeedSenseError {
    fn from(e: duckdb::Error) -> Self {
        SpeedSenseError::StoreFailure(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SpeedSenseError>;
