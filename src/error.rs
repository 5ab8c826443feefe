//! 统一错误模型
//! 定义所有错误类型和错误响应格式

use axum::{
    extract::rejection::{FormRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::{middleware::current_request_id, repository::StoreError};

/// 应用错误类型
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthenticated: {message}")]
    Unauthenticated {
        message: String,
        #[source]
        source: Option<StoreError>,
    },

    #[error("Access denied")]
    Forbidden,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Storage error: {0}")]
    Storage(#[source] StoreError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// 获取 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthenticated { .. } => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::AlreadyExists(_) => StatusCode::CONFLICT,
            AppError::Storage(StoreError::Timeout(_)) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Storage(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 获取用户友好的错误消息（不包含敏感信息）
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::Unauthenticated { source: Some(_), .. } => {
                "error verifying credentials".to_string()
            }
            AppError::Unauthenticated { message, .. } => message.clone(),
            AppError::Forbidden => "you are not allowed to update this resource".to_string(),
            AppError::NotFound(msg) => format!("{} not found", msg),
            AppError::AlreadyExists(msg) => format!("{} exists", msg),
            AppError::Storage(StoreError::Timeout(_)) => "Storage timed out".to_string(),
            AppError::Storage(_) => "Storage error occurred".to_string(),
            AppError::Internal(_) => "Internal server error".to_string(),
        }
    }

    /// 获取错误码
    pub fn code(&self) -> u16 {
        self.status_code().as_u16()
    }

    // 便捷方法
    pub fn unauthenticated(msg: &str) -> Self {
        AppError::Unauthenticated {
            message: msg.to_string(),
            source: None,
        }
    }

    pub fn validation(msg: &str) -> Self {
        AppError::Validation(msg.to_string())
    }

    pub fn not_found(msg: &str) -> Self {
        AppError::NotFound(msg.to_string())
    }

    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, AppError::Unauthenticated { .. })
    }
}

/// 错误响应 DTO
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: u16,
    pub message: String,
    pub request_id: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        // 与响应头 x-request-id 保持一致
        let request_id =
            current_request_id().unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        let error_response = ErrorResponse {
            error: ErrorDetail {
                code: self.code(),
                message: self.user_message(),
                request_id,
            },
        };

        // 服务端错误记 error，客户端错误记 debug
        if status.is_server_error() {
            tracing::error!(
                code = self.code(),
                message = %self,
                request_id = %error_response.error.request_id,
                "Application error"
            );
        } else {
            tracing::debug!(
                code = self.code(),
                message = %self,
                request_id = %error_response.error.request_id,
                "Request rejected"
            );
        }

        (status, Json(error_response)).into_response()
    }
}

/// 存储冲突对调用方表现为资源已存在
impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict(what) => AppError::AlreadyExists(what),
            other => AppError::Storage(other),
        }
    }
}

/// 表单解析失败（Content-Type 错误、字段类型不符、请求体读取失败）
impl From<FormRejection> for AppError {
    fn from(rejection: FormRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

/// 路径参数无法解析时资源不可能存在；id 对客户端是不透明的
impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        match rejection {
            PathRejection::FailedToDeserializePathParams(_) => AppError::not_found("resource"),
            other => AppError::Internal(other.body_text()),
        }
    }
}

/// 表单校验失败转换为 Validation，取第一条消息
impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let message = errors
            .field_errors()
            .values()
            .flat_map(|errs| errs.iter())
            .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
            .unwrap_or_else(|| "invalid request".to_string());
        AppError::Validation(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_error_codes() {
        assert_eq!(AppError::unauthenticated("x").code(), 401);
        assert_eq!(AppError::Forbidden.code(), 403);
        assert_eq!(AppError::not_found("user").code(), 404);
        assert_eq!(AppError::AlreadyExists("user".to_string()).code(), 409);
        assert_eq!(AppError::validation("test").code(), 400);
        assert_eq!(AppError::Storage(StoreError::Timeout(Duration::from_secs(1))).code(), 503);
    }

    #[test]
    fn test_store_conflict_becomes_already_exists() {
        let err: AppError = StoreError::Conflict("user".to_string()).into();
        assert!(matches!(err, AppError::AlreadyExists(ref what) if what == "user"));
        assert_eq!(err.user_message(), "user exists");
    }

    #[test]
    fn test_user_message_no_sensitive_info() {
        let error = AppError::Storage(StoreError::Database(sqlx::Error::RowNotFound));
        let message = error.user_message();
        assert_eq!(message, "Storage error occurred");
        assert!(!message.contains("sqlx"));

        let wrapped = AppError::Unauthenticated {
            message: "error verifying token".to_string(),
            source: Some(StoreError::Unavailable("connection reset".to_string())),
        };
        assert_eq!(wrapped.user_message(), "error verifying credentials");
    }
}
