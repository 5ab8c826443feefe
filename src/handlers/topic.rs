//! 主题与帖子的 HTTP 处理器

use crate::{
    auth::Principal,
    error::AppError,
    middleware::AppState,
    models::content::*,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Form, Json,
};
use axum_extra::extract::WithRejection;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// 列出主题
pub async fn list_topics(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let topics = state.content_service.list_topics().await?;
    Ok(Json(topics))
}

/// 创建主题
pub async fn create_topic(
    State(state): State<Arc<AppState>>,
    WithRejection(Form(req), _): WithRejection<Form<CreateTopicRequest>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;
    let topic = state.content_service.create_topic(&req.title).await?;
    Ok((StatusCode::CREATED, Json(topic)))
}

/// 主题下的帖子，主题不存在时 404
pub async fn list_topic_posts(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(topic_id), _): WithRejection<Path<Uuid>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let topic = state.content_service.get_topic(topic_id).await?;
    let posts = state.content_service.list_posts(topic.id).await?;
    Ok(Json(posts))
}

/// 发帖，作者取自认证用户
pub async fn create_post(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    WithRejection(Path(topic_id), _): WithRejection<Path<Uuid>, AppError>,
    WithRejection(Form(req), _): WithRejection<Form<CreatePostRequest>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;
    let post = state
        .content_service
        .create_post(topic_id, &principal.username, &req.content)
        .await?;
    Ok((StatusCode::CREATED, Json(post)))
}

/// 删除主题
pub async fn delete_topic(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(topic_id), _): WithRejection<Path<Uuid>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    state.content_service.delete_topic(topic_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// 删除帖子
pub async fn delete_post(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(post_id), _): WithRejection<Path<Uuid>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    state.content_service.delete_post(post_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
