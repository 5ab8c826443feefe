//! HTTP 中间件
//! 应用状态与请求追踪

use axum::{extract::Request, http::HeaderMap, http::HeaderValue, middleware::Next, response::Response};
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

use crate::{
    auth::{AuthorizationGate, OwnershipPolicy, PasswordHasher},
    config::AppConfig,
    repository::Repositories,
    services::{AuthService, ContentService, UserService},
};

/// 应用状态
///
/// 所有依赖在启动时显式构造并注入，不使用全局单例。
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub repositories: Repositories,
    pub auth_service: Arc<AuthService>,
    pub user_service: Arc<UserService>,
    pub content_service: Arc<ContentService>,
    pub gate: Arc<AuthorizationGate>,
    pub ownership: OwnershipPolicy,
}

impl AppState {
    pub fn new(config: AppConfig, repositories: Repositories) -> Self {
        let timeout = config.database.query_timeout();
        let hasher = PasswordHasher::from_config(&config.security);

        let auth_service = Arc::new(AuthService::new(
            repositories.users.clone(),
            repositories.authorizations.clone(),
            hasher.clone(),
            timeout,
        ));
        let user_service = Arc::new(UserService::new(
            repositories.users.clone(),
            hasher,
            timeout,
        ));
        let content_service = Arc::new(ContentService::new(repositories.content.clone(), timeout));
        let gate = Arc::new(AuthorizationGate::new(
            repositories.authorizations.clone(),
            config.security.credential_transport.build(),
            timeout,
        ));
        let ownership = OwnershipPolicy::new(config.security.admin_username.clone());

        Self {
            config,
            repositories,
            auth_service,
            user_service,
            content_service,
            gate,
            ownership,
        }
    }
}

tokio::task_local! {
    static REQUEST_ID: String;
}

/// 当前请求的 request_id（仅在请求处理过程中可用）
pub fn current_request_id() -> Option<String> {
    REQUEST_ID.try_with(|id| id.clone()).ok()
}

/// 请求追踪中间件
/// 为每个请求生成 trace_id 和 request_id，并记录指标
pub async fn request_tracking_middleware(req: Request, next: Next) -> Response {
    let trace_id = extract_or_generate_trace_id(req.headers());
    let request_id = Uuid::new_v4().to_string();

    let method = req.method().to_string();
    let uri = req.uri().path().to_string();

    let span = tracing::info_span!(
        "http_request",
        trace_id = %trace_id,
        request_id = %request_id,
        method = %method,
        uri = %uri,
        principal = tracing::field::Empty,
    );

    async move {
        let start = Instant::now();

        let mut response = REQUEST_ID.scope(request_id.clone(), next.run(req)).await;

        let elapsed = start.elapsed();
        let status = response.status().as_u16();

        // 指标标签只用静态字符串
        let method_name = match method.as_str() {
            "GET" => "GET",
            "POST" => "POST",
            "PUT" => "PUT",
            "DELETE" => "DELETE",
            _ => "OTHER",
        };
        let status_class = match status {
            200..=299 => "2xx",
            400..=499 => "4xx",
            500..=599 => "5xx",
            _ => "other",
        };

        metrics::counter!("http_requests_total", "method" => method_name, "status" => status_class)
            .increment(1);
        metrics::histogram!("http_request_duration_seconds").record(elapsed.as_secs_f64());

        tracing::info!(
            method = %method,
            uri = %uri,
            status = status,
            elapsed_ms = elapsed.as_millis() as u64,
            "Request completed"
        );

        // 在响应头中添加 trace_id
        if let Ok(value) = HeaderValue::from_str(&trace_id) {
            response.headers_mut().insert("x-trace-id", value);
        }
        if let Ok(value) = HeaderValue::from_str(&request_id) {
            response.headers_mut().insert("x-request-id", value);
        }

        response
    }
    .instrument(span)
    .await
}

/// 从请求头中提取或生成 trace_id
fn extract_or_generate_trace_id(headers: &HeaderMap) -> String {
    headers
        .get("x-trace-id")
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}
