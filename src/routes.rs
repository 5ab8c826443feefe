//! 路由注册
//! 创建所有 API 路由并应用中间件

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;

use crate::{auth::require_principal, error::AppError, handlers, middleware::AppState};

/// 创建应用路由
pub fn create_router(state: Arc<AppState>) -> Router {
    // 公开端点（健康检查）
    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check));

    // 认证路由（无需认证）
    let auth_routes = Router::new()
        .route("/auth", post(handlers::auth::login))
        .route("/setup", get(handlers::auth::setup));

    // 需要认证的路由
    let authenticated_routes = Router::new()
        .route("/me", get(handlers::user::get_current_user))
        // 主题
        .route(
            "/topics",
            get(handlers::topic::list_topics).post(handlers::topic::create_topic),
        )
        .route(
            "/topics/{topic_id}",
            get(handlers::topic::list_topic_posts)
                .post(handlers::topic::create_post)
                .delete(handlers::topic::delete_topic),
        )
        // 帖子
        .route("/posts/{post_id}", delete(handlers::topic::delete_post))
        // 用户
        .route("/users", post(handlers::user::create_user))
        .route("/users/{username}", put(handlers::user::update_user))
        .layer(axum::middleware::from_fn_with_state(
            state.gate.clone(),
            require_principal,
        ));

    // 组合所有路由
    Router::new()
        .merge(public_routes)
        .merge(auth_routes)
        .merge(authenticated_routes)
        .fallback(route_not_found)
        .layer(RequestBodyLimitLayer::new(state.config.server.body_limit_bytes))
        .layer(axum::middleware::from_fn(crate::middleware::request_tracking_middleware))
        .with_state(state)
}

/// 未匹配的路由同样使用 JSON 错误格式
async fn route_not_found() -> AppError {
    AppError::not_found("route")
}
