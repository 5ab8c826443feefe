//! 论坛服务主入口

use dialogue::{
    config::{AppConfig, StorageBackend},
    db,
    handlers::health,
    middleware::AppState,
    repository::Repositories,
    routes, telemetry,
};
use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::Notify;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ===== CLI 参数处理 =====
    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 {
        match args[1].as_str() {
            "--version" => {
                println!("dialogue {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" => {
                print_help();
                return Ok(());
            }
            _ => {
                eprintln!("未知参数: {}", args[1]);
                print_help();
                std::process::exit(1);
            }
        }
    }

    // 加载 .env 文件（开发环境）
    // 按优先级加载：.env.local > .env.development > .env
    if let Ok(env) = std::env::var("DIALOGUE_ENV") {
        dotenv::from_filename(format!(".env.{}", env)).ok();
    } else {
        dotenv::from_filename(".env.local").ok();
        dotenv::from_filename(".env.development").ok();
        dotenv::dotenv().ok();
    }

    health::set_start_time();

    // 1. 加载配置
    let config = AppConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        anyhow::anyhow!("Failed to load configuration: {}", e)
    })?;

    // 2. 初始化日志
    telemetry::init_telemetry(&config.logging)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        backend = ?config.database.backend,
        transport = ?config.security.credential_transport,
        "Dialogue API starting..."
    );

    // 3. 存储后端
    let repositories = match config.database.backend {
        StorageBackend::Postgres => {
            let pool = db::create_pool(&config.database).await?;
            db::run_migrations(&pool).await?;
            Repositories::from_store(Arc::new(db::PgStore::new(pool)))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on shutdown");
            Repositories::in_memory()
        }
    };

    tracing::info!("Storage initialized");

    // 4. 构建应用状态与路由
    let app_state = Arc::new(AppState::new(config.clone(), repositories));
    let app = routes::create_router(app_state);

    // 5. 启动服务器
    let addr = &config.server.addr;
    let listener = TcpListener::bind(addr).await?;

    tracing::info!(addr = %addr, "Server listening");

    // 6. 优雅关闭：收到信号后最多等待 graceful_shutdown_timeout_secs
    let shutdown = Arc::new(Notify::new());
    let grace = Duration::from_secs(config.server.graceful_shutdown_timeout_secs);

    let server = axum::serve(listener, app)
        .with_graceful_shutdown({
            let shutdown = shutdown.clone();
            async move {
                shutdown_signal().await;
                shutdown.notify_one();
            }
        })
        .into_future();

    tokio::select! {
        result = server => {
            result?;
            tracing::info!("Server shutdown complete");
        }
        _ = drain_deadline(shutdown, grace) => {
            tracing::warn!(
                timeout_secs = grace.as_secs(),
                "Graceful shutdown timeout reached, dropping open connections"
            );
        }
    }

    Ok(())
}

/// 收到关闭信号后开始计时，超时即放弃等待在途请求
async fn drain_deadline(shutdown: Arc<Notify>, grace: Duration) {
    shutdown.notified().await;
    tokio::time::sleep(grace).await;
}

/// 优雅关闭信号处理
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Ctrl+C received, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Terminate signal received, starting graceful shutdown");
        },
    }
}

/// 打印帮助信息
fn print_help() {
    println!("dialogue {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("用法: dialogue [选项]");
    println!();
    println!("选项:");
    println!("  --version     打印版本信息并退出");
    println!("  --help        打印此帮助信息并退出");
    println!();
    println!("环境变量 (前缀 DIALOGUE_, 层级分隔符 __):");
    println!("  DIALOGUE_SERVER__ADDR                      监听地址 (默认 0.0.0.0:3000)");
    println!("  DIALOGUE_SERVER__GRACEFUL_SHUTDOWN_TIMEOUT_SECS  关闭时等待在途请求的上限");
    println!("  DIALOGUE_DATABASE__BACKEND                 postgres | memory");
    println!("  DIALOGUE_DATABASE__URL                     PostgreSQL 连接串");
    println!("  DIALOGUE_DATABASE__QUERY_TIMEOUT_MS        单次存储调用超时");
    println!("  DIALOGUE_SECURITY__PASSWORD_HASH_COST      Argon2 时间成本");
    println!("  DIALOGUE_SECURITY__CREDENTIAL_TRANSPORT    header | cookie");
    println!("  DIALOGUE_LOGGING__LEVEL / __FORMAT         日志级别与格式");
}
