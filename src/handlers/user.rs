//! 用户管理的 HTTP 处理器

use crate::{
    auth::Principal,
    error::AppError,
    middleware::AppState,
    models::user::*,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Form, Json,
};
use axum_extra::extract::WithRejection;
use std::sync::Arc;

/// 创建用户
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    WithRejection(Form(req), _): WithRejection<Form<CreateUserRequest>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let user = state
        .user_service
        .register(&req.username, &req.password)
        .await?;

    tracing::info!(actor = %principal.username, username = %user.username, "User registered");

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// 修改密码：本人或管理员
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    WithRejection(Path(username), _): WithRejection<Path<String>, AppError>,
    WithRejection(Form(req), _): WithRejection<Form<UpdateUserRequest>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    state.ownership.authorize(&principal.username, &username)?;

    state
        .user_service
        .update_password(&username, &req.password)
        .await?;

    tracing::info!(actor = %principal.username, target = %username, "User updated");

    Ok(StatusCode::NO_CONTENT)
}

/// 当前用户
pub async fn get_current_user(principal: Principal) -> Json<Principal> {
    Json(principal)
}
