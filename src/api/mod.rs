//! HTTP 接口
//!
//! - `GET /` 首页
//! - `POST /data` 上传一批传感器读数
//! - `GET /get-data` 全部记录
//! - `GET /get-data-between?start=..&end=..` 区间记录及速度估计

pub mod dto;
pub mod error;
pub mod handlers;

use axum::{
    routing::{get, post},
    Router,
};

use crate::database::DatabaseClient;

pub use error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseClient,
}

impl AppState {
    pub fn new(db: DatabaseClient) -> Self {
        Self { db }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/data", post(handlers::process_sensor_data))
        .route("/get-data", get(handlers::get_data))
        .route("/get-data-between", get(handlers::get_data_between))
        .with_state(state)
}
