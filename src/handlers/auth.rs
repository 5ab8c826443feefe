//! 认证相关的 HTTP 处理器

use crate::{
    auth::{
        transport::{TOKEN_COOKIE, USER_COOKIE},
        TransportKind,
    },
    error::AppError,
    middleware::AppState,
    models::auth::*,
};
use axum::{extract::State, response::IntoResponse, Form, Json};
use axum_extra::extract::{
    cookie::{Cookie, CookieJar, SameSite},
    WithRejection,
};
use secrecy::ExposeSecret;
use std::sync::Arc;

/// 登录，返回新令牌（旧令牌随即失效）
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    WithRejection(Form(req), _): WithRejection<Form<LoginRequest>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let token = state
        .auth_service
        .login(&req.username, &req.password)
        .await?;

    // cookie 传输方式下同时下发会话 cookie
    let jar = match state.config.security.credential_transport {
        TransportKind::Cookie => jar
            .add(session_cookie(USER_COOKIE, req.username))
            .add(session_cookie(TOKEN_COOKIE, token.clone())),
        TransportKind::Header => jar,
    };

    Ok((jar, Json(TokenResponse { token })))
}

/// 初始化管理员账户
pub async fn setup(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    let admin = state.ownership.admin();
    state
        .user_service
        .ensure_admin(admin, state.config.security.admin_password.expose_secret())
        .await?;

    Ok(Json(MessageResponse {
        response: format!("admin user created: username: {}", admin),
    }))
}

fn session_cookie(name: &'static str, value: String) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie(TOKEN_COOKIE, "abc".to_string());
        assert_eq!(cookie.name(), TOKEN_COOKIE);
        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
    }
}
