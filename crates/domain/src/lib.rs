//! 实时讨论事件的核心领域模型
//!
//! 包含社区、讨论、评论等实体，推送事件的载荷与信封，
//! 以及数据访问层需要实现的仓储接口。

pub mod entities;
pub mod errors;
pub mod events;
pub mod repositories;
pub mod value_objects;

// 重新导出常用类型
pub use entities::*;
pub use errors::*;
pub use events::*;
pub use repositories::*;
pub use value_objects::*;
