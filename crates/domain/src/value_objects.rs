use std::fmt;

use serde::{Deserialize, Serialize};

/// 统一的时间戳类型。
pub type Timestamp = chrono::DateTime<chrono::Utc>;

macro_rules! integer_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            pub fn new(id: i64) -> Self {
                Self(id)
            }

            pub fn value(&self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for i64 {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

integer_id!(
    /// 用户唯一标识。
    UserId
);
integer_id!(
    /// 社区唯一标识。
    CommunityId
);
integer_id!(
    /// 文章唯一标识。
    ArticleId
);
integer_id!(
    /// 社区文章（文章投稿到某个社区后的关联记录）唯一标识。
    CommunityArticleId
);
integer_id!(
    /// 讨论唯一标识。
    DiscussionId
);
integer_id!(
    /// 讨论评论唯一标识。
    CommentId
);
