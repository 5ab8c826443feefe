//! 数据模型模块
//! 用户、授权令牌与论坛内容

pub mod auth;
pub mod content;
pub mod user;
