//! # 请求处理器

pub mod instagram;
pub mod system;
