//! 日志与追踪系统
//!
//! 请求 span（见 `middleware::request_tracking_middleware`）携带 trace_id、
//! request_id 与认证后的 principal；JSON 格式下这些字段随每条事件输出。

use crate::config::LoggingConfig;
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, util::TryInitError,
    EnvFilter, Layer,
};

/// 依赖库默认只输出告警，避免淹没业务日志
const QUIET_DEPENDENCIES: &[&str] = &["sqlx=warn", "hyper=warn", "tower_http=info"];

/// 初始化日志与追踪系统
///
/// `RUST_LOG` 优先于 `logging.level`。重复初始化返回错误而不是 panic。
pub fn init_telemetry(config: &LoggingConfig) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| build_filter(&config.level));

    let log_layer = match config.format.to_lowercase().as_str() {
        // 生产环境：扁平 JSON，附带当前请求 span 的字段
        "json" => tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .with_span_list(false)
            .with_target(false)
            .with_span_events(FmtSpan::CLOSE)
            .boxed(),
        _ => tracing_subscriber::fmt::layer()
            .pretty()
            .with_target(false)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(log_layer)
        .try_init()?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        level = %config.level,
        format = %config.format,
        "Telemetry initialized"
    );
    Ok(())
}

/// 业务日志使用配置的级别，依赖库使用固定的安静级别
fn build_filter(level: &str) -> EnvFilter {
    let directives = std::iter::once(level.to_lowercase())
        .chain(QUIET_DEPENDENCIES.iter().map(|d| d.to_string()))
        .collect::<Vec<_>>()
        .join(",");
    EnvFilter::new(directives)
}
