//! Redis 发布订阅模块
//!
//! 把事件信封发布到投递服务器订阅的频道上。

pub mod error;
pub mod publisher;

// 重新导出
pub use error::*;
pub use publisher::*;
