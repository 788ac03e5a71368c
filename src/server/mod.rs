//! # HTTP 服务
//!
//! 基于 Axum 的对外接口：授权入口、授权回调、feed 查询、首页与健康检查。

pub mod api;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;

pub use api::{ApiServer, AppState};
pub use routes::create_routes;
