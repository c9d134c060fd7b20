//! Web API 层。
//!
//! 提供 Axum 路由，把实时推送的注册、心跳、状态请求委托给应用层的用例服务。

mod auth;
mod error;
mod routes;
mod state;

pub use auth::{Claims, JwtService};
pub use config::JwtConfig;
pub use error::{ApiError, ErrorBody};
pub use routes::router;
pub use state::AppState;
