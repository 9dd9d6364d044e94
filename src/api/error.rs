use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::error::SpeedSenseError;

/// 所有失败都返回 `{"error": "..."}`
#[derive(Debug)]
pub struct ApiError(pub SpeedSenseError);

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        if self.0.is_validation() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl From<SpeedSenseError> for ApiError {
    fn from(e: SpeedSenseError) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorBody {
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_bad_requests() {
        for e in [
            SpeedSenseError::InvalidPayload("x".into()),
            SpeedSenseError::InvalidTimestamp("x".into()),
            SpeedSenseError::InvalidRecordTimestamp("x".into()),
            SpeedSenseError::UnknownSensorType("x".into()),
            SpeedSenseError::InvalidRange("x".into()),
        ] {
            assert_eq!(ApiError(e).status_code(), StatusCode::BAD_REQUEST);
        }
        assert_eq!(
            ApiError(SpeedSenseError::StoreFailure("x".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
