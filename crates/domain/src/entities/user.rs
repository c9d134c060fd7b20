//! 用户实体定义

use serde::{Deserialize, Serialize};

use crate::value_objects::UserId;

/// 用户基础信息
///
/// 只包含推送载荷里展示作者所需的字段，不含声誉等统计信息。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: UserId,
    pub username: String,
    pub profile_pic_url: Option<String>,
}

impl UserSummary {
    pub fn new(id: UserId, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            profile_pic_url: None,
        }
    }
}
