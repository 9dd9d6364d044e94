use dotenv::dotenv;
use log::{error, info};

use speedsense::api::{create_router, AppState};
use speedsense::config::ConfigManager;
use speedsense::database::{spawn_database_handler, DatabaseManager};
use speedsense::logger;

#[tokio::main]
async fn main() {
    dotenv().ok(); // 加载 .env 文件

    let config_manager = match ConfigManager::from_env() {
        Ok(manager) => manager,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    let config = config_manager.get_config().clone();

    logger::init_logger(&config.logging);
    info!("Application starting");
    if let Some(path) = config_manager.config_path() {
        info!("Configuration loaded from {}", path.display());
    }

    let db_path = config.get_database_path();
    let auto_create_dir = config.database.auto_create_dir;
    let options = config.ingest_options();
    let capacity = config.channels.db_task_channel_capacity;
    // 等待数据库线程就绪是阻塞操作，放到阻塞线程池执行
    let spawned = tokio::task::spawn_blocking(move || {
        spawn_database_handler(
            move || Ok(DatabaseManager::open(&db_path, auto_create_dir)?),
            options,
            capacity,
        )
    })
    .await;
    let (db_client, db_handle) = match spawned {
        Ok(Ok(pair)) => pair,
        Ok(Err(e)) => {
            error!("Failed to initialize database: {}", e);
            std::process::exit(1);
        }
        Err(e) => {
            error!("Database startup task failed: {}", e);
            std::process::exit(1);
        }
    };

    match db_client.stats().await {
        Ok(stats) => info!(
            "Database contains {} accelerometer / {} gyroscope records",
            stats.accelerometer, stats.gyroscope
        ),
        Err(e) => error!("Failed to read database stats: {}", e),
    }

    let app = create_router(AppState::new(db_client));

    let address = config.bind_address();
    let listener = match tokio::net::TcpListener::bind(&address).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", address, e);
            db_handle.close().await;
            std::process::exit(1);
        }
    };
    info!("HTTP server listening on {}", address);

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("HTTP server failed: {}", e);
    }

    // HTTP 服务退出后，通知数据库线程关闭
    info!("HTTP server stopped, signaling database thread to shutdown");
    db_handle.close().await;
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        // 无法监听信号时一直运行
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
