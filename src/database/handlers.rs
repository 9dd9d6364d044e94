use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TrySendError};
use log::{debug, error, info, warn};
use tokio::sync::oneshot;

use super::store::SensorStore;
use crate::error::{Result, SpeedSenseError};
use crate::ingestion::{ingest, IngestOptions};
use crate::query;
use crate::types::{AllRecords, DatabaseTask, IngestRequest, RangeReport, StoreStats};

/// 数据库线程主循环
/// 存储只被这一个线程持有，任务按到达顺序逐个执行，批次之间不会交错
pub fn run_database_handler<S: SensorStore>(
    mut store: S,
    options: IngestOptions,
    task_receiver: Receiver<DatabaseTask>,
    shutdown_signal: Arc<AtomicBool>,
) {
    info!("Database handler thread started");

    while !shutdown_signal.load(Ordering::Relaxed) {
        match task_receiver.recv_timeout(Duration::from_millis(100)) {
            Ok(task) => handle_task(&mut store, &options, task),
            Err(RecvTimeoutError::Timeout) => {
                // 超时，继续循环检查关闭信号
                continue;
            }
            Err(RecvTimeoutError::Disconnected) => {
                info!("Database handler: Task channel disconnected, exiting");
                break;
            }
        }
    }

    info!("Database handler thread exiting gracefully");
}

fn handle_task<S: SensorStore>(store: &mut S, options: &IngestOptions, task: DatabaseTask) {
    let name = task.name();
    let delivered = match task {
        DatabaseTask::Ingest {
            request,
            response_sender,
        } => response_sender.send(ingest(store, &request, options)).is_ok(),
        DatabaseTask::ListAll { response_sender } => {
            let result = query::list_all(store);
            if let Err(e) = &result {
                error!("Database handler: Failed to list records: {}", e);
            }
            response_sender.send(result).is_ok()
        }
        DatabaseTask::QueryRange {
            start,
            end,
            response_sender,
        } => {
            let result = query::query_range(store, start.as_deref(), end.as_deref());
            if let Err(e) = &result {
                if !e.is_validation() {
                    error!("Database handler: Range query failed: {}", e);
                }
            }
            response_sender.send(result).is_ok()
        }
        DatabaseTask::GetStats { response_sender } => response_sender.send(store.stats()).is_ok(),
    };

    if !delivered {
        warn!("Database handler: Requester of {} went away before the reply", name);
    }
}

/// 向数据库线程投递任务的句柄，可在多个请求间克隆共享
#[derive(Clone)]
pub struct DatabaseClient {
    task_sender: Sender<DatabaseTask>,
}

impl DatabaseClient {
    pub fn new(task_sender: Sender<DatabaseTask>) -> Self {
        Self { task_sender }
    }

    async fn dispatch<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<Result<T>>) -> DatabaseTask,
    ) -> Result<T> {
        let (response_sender, response_receiver) = oneshot::channel();
        match self.task_sender.try_send(build(response_sender)) {
            Ok(()) => {}
            Err(TrySendError::Full(task)) => {
                // 队列已满，在阻塞线程池中排队等待空位，不占用异步工作线程
                debug!("Database task queue is full, waiting for a free slot");
                let task_sender = self.task_sender.clone();
                tokio::task::spawn_blocking(move || task_sender.send(task))
                    .await
                    .map_err(|e| {
                        SpeedSenseError::StoreFailure(format!("Failed to queue database task: {}", e))
                    })?
                    .map_err(|_| handler_not_running())?;
            }
            Err(TrySendError::Disconnected(_)) => return Err(handler_not_running()),
        }

        response_receiver.await.map_err(|_| {
            SpeedSenseError::StoreFailure("Database handler dropped the request".to_string())
        })?
    }

    pub async fn ingest(&self, request: IngestRequest) -> Result<usize> {
        self.dispatch(|response_sender| DatabaseTask::Ingest {
            request,
            response_sender,
        })
        .await
    }

    pub async fn list_all(&self) -> Result<AllRecords> {
        self.dispatch(|response_sender| DatabaseTask::ListAll { response_sender })
            .await
    }

    pub async fn query_range(&self, start: Option<String>, end: Option<String>) -> Result<RangeReport> {
        self.dispatch(|response_sender| DatabaseTask::QueryRange {
            start,
            end,
            response_sender,
        })
        .await
    }

    pub async fn stats(&self) -> Result<StoreStats> {
        self.dispatch(|response_sender| DatabaseTask::GetStats { response_sender })
            .await
    }
}

fn handler_not_running() -> SpeedSenseError {
    SpeedSenseError::StoreFailure("Database handler is not running".to_string())
}

/// 数据库线程的关闭句柄
pub struct DatabaseHandle {
    shutdown_signal: Arc<AtomicBool>,
    join_handle: JoinHandle<()>,
}

impl DatabaseHandle {
    pub fn shutdown(self) {
        self.shutdown_signal.store(true, Ordering::Relaxed);
        match self.join_handle.join() {
            Ok(()) => info!("Database thread shut down gracefully"),
            Err(e) => error!("Database thread panicked: {:?}", e),
        }
    }

    /// 异步上下文中关闭，等待线程退出的过程放到阻塞线程池
    pub async fn close(self) {
        if let Err(e) = tokio::task::spawn_blocking(move || self.shutdown()).await {
            error!("Database shutdown task failed: {}", e);
        }
    }
}

/// 启动数据库线程
/// 存储在线程内部打开，打开失败时直接返回错误
pub fn spawn_database_handler<S, F>(
    open_store: F,
    options: IngestOptions,
    channel_capacity: usize,
) -> Result<(DatabaseClient, DatabaseHandle)>
where
    S: SensorStore + 'static,
    F: FnOnce() -> Result<S> + Send + 'static,
{
    let (task_sender, task_receiver) = bounded(channel_capacity);
    let (ready_sender, ready_receiver) = bounded::<Result<()>>(1);
    let shutdown_signal = Arc::new(AtomicBool::new(false));

    let thread_shutdown = Arc::clone(&shutdown_signal);
    let join_handle = thread::Builder::new()
        .name("database".to_string())
        .spawn(move || {
            let store = match open_store() {
                Ok(store) => {
                    let _ = ready_sender.send(Ok(()));
                    store
                }
                Err(e) => {
                    error!("Database handler thread: Failed to open store: {}", e);
                    let _ = ready_sender.send(Err(e));
                    return;
                }
            };
            run_database_handler(store, options, task_receiver, thread_shutdown);
        })
        .map_err(|e| SpeedSenseError::StoreFailure(format!("Failed to spawn database thread: {}", e)))?;

    let handle = DatabaseHandle {
        shutdown_signal,
        join_handle,
    };

    match ready_receiver.recv() {
        Ok(Ok(())) => Ok((DatabaseClient::new(task_sender), handle)),
        Ok(Err(e)) => {
            handle.shutdown();
            Err(e)
        }
        Err(_) => {
            handle.shutdown();
            Err(SpeedSenseError::StoreFailure(
                "Database thread exited during startup".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::DatabaseManager;
    use crate::types::RawReading;

    fn open_memory() -> Result<DatabaseManager> {
        Ok(DatabaseManager::in_memory()?)
    }

    #[tokio::test]
    async fn client_round_trip_through_thread() {
        let (client, handle) =
            spawn_database_handler(open_memory, IngestOptions::default(), 8).unwrap();

        let request = IngestRequest {
            sensor_type: Some("gyroscope".to_string()),
            timestamp: Some("2024-03-01T10:00:00Z".to_string()),
            data: Some(vec![RawReading {
                timestamp: Some("2024-03-01T10:00:00Z".to_string()),
                x: Some(0.25),
                ..Default::default()
            }]),
            device_id: Some("watch1234".to_string()),
        };
        assert_eq!(client.ingest(request).await.unwrap(), 1);
        assert_eq!(
            client.stats().await.unwrap(),
            StoreStats {
                accelerometer: 0,
                gyroscope: 1
            }
        );

        let all = client.list_all().await.unwrap();
        assert_eq!(all.gyroscope[0].axes.x, Some(0.25));

        handle.shutdown();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_ingests_wait_for_queue_space() {
        let (client, handle) =
            spawn_database_handler(open_memory, IngestOptions::default(), 4).unwrap();

        // 每批 20 条，批次基准时间相隔 1 秒，排序键互不重叠
        let uploads: Vec<_> = (0..300)
            .map(|n| {
                let client = client.clone();
                let base = format!("2024-03-01T10:{:02}:{:02}Z", n / 60, n % 60);
                let request = IngestRequest {
                    sensor_type: Some("accelerometer".to_string()),
                    timestamp: Some(base.clone()),
                    data: Some(
                        (0..20)
                            .map(|_| RawReading {
                                timestamp: Some(base.clone()),
                                magnitude: Some(1.0),
                                ..Default::default()
                            })
                            .collect(),
                    ),
                    device_id: None,
                };
                tokio::spawn(async move { client.ingest(request).await })
            })
            .collect();

        for upload in uploads {
            assert_eq!(upload.await.unwrap(), Ok(20));
        }
        assert_eq!(
            client.stats().await.unwrap(),
            StoreStats {
                accelerometer: 6000,
                gyroscope: 0
            }
        );

        handle.close().await;
    }

    #[tokio::test]
    async fn failed_open_is_reported() {
        let result = spawn_database_handler(
            || -> Result<DatabaseManager> { Err(SpeedSenseError::StoreFailure("boom".to_string())) },
            IngestOptions::default(),
            8,
        );
        assert_eq!(
            result.err(),
            Some(SpeedSenseError::StoreFailure("boom".to_string()))
        );
    }

    #[tokio::test]
    async fn requests_after_shutdown_fail_as_store_errors() {
        let (client, handle) =
            spawn_database_handler(open_memory, IngestOptions::default(), 8).unwrap();
        handle.shutdown();

        let err = client.list_all().await.unwrap_err();
        assert!(!err.is_validation());
    }
}
