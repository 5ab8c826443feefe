//! Business logic services layer

pub mod auth_service;
pub mod content_service;
pub mod user_service;

pub use auth_service::AuthService;
pub use content_service::ContentService;
pub use user_service::UserService;
