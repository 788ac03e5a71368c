//! # 服务中间件

pub mod api_key;
pub mod request_id;

pub use api_key::{api_key_middleware, is_public_path};
pub use request_id::{RequestId, request_id_middleware};
