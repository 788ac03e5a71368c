//! # 路由配置

use axum::Router;
use axum::routing::get;

use super::handlers::{instagram, system};
use super::middleware::{api_key_middleware, request_id_middleware};
use super::AppState;

/// 创建所有路由
///
/// 中间件执行顺序：request_id → api_key → handler。
pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(system::home_handler))
        .route("/ping", get(system::ping_handler))
        .nest("/instagram", instagram_routes())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            api_key_middleware,
        ))
        .layer(axum::middleware::from_fn(request_id_middleware))
        .with_state(state)
}

/// Instagram 授权与 feed 路由
fn instagram_routes() -> Router<AppState> {
    Router::new()
        .route("/auth", get(instagram::get_auth_url))
        .route("/auth/callback", get(instagram::auth_callback))
        .route("/feed/{username}", get(instagram::get_feed))
}
