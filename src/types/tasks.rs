use tokio::sync::oneshot;

use super::{AllRecords, IngestRequest, RangeReport, StoreStats};
use crate::error::Result;

/// 发往数据库线程的任务
/// 所有读写都在同一线程里按顺序执行
pub enum DatabaseTask {
    Ingest {
        request: IngestRequest,
        response_sender: oneshot::Sender<Result<usize>>,
    },
    ListAll {
        response_sender: oneshot::Sender<Result<AllRecords>>,
    },
    QueryRange {
        start: Option<String>,
        end: Option<String>,
        response_sender: oneshot::Sender<Result<RangeReport>>,
    },
    GetStats {
        response_sender: oneshot::Sender<Result<StoreStats>>,
    },
}

impl DatabaseTask {
    pub fn name(&self) -> &'static str {
        match self {
            DatabaseTask::Ingest { .. } => "ingest",
            DatabaseTask::ListAll { .. } => "list_all",
            DatabaseTask::QueryRange { .. } => "query_range",
            DatabaseTask::GetStats { .. } => "get_stats",
        }
    }
}
