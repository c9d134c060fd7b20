//! 社区实体定义
//!
//! 包含社区、社区角色以及社区文章关联。

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;
use crate::value_objects::{ArticleId, CommunityArticleId, CommunityId};

/// 社区可见性
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommunityVisibility {
    Public,
    Private,
    Hidden,
}

impl CommunityVisibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
            Self::Hidden => "hidden",
        }
    }
}

impl fmt::Display for CommunityVisibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommunityVisibility {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "public" => Ok(Self::Public),
            "private" => Ok(Self::Private),
            "hidden" => Ok(Self::Hidden),
            other => Err(DomainError::invalid_value("community.type", other)),
        }
    }
}

/// 用户在社区中的角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommunityRole {
    Member,
    Admin,
    Moderator,
    Reviewer,
}

impl CommunityRole {
    pub const ALL: [CommunityRole; 4] = [
        CommunityRole::Member,
        CommunityRole::Admin,
        CommunityRole::Moderator,
        CommunityRole::Reviewer,
    ];

    /// 未提供订阅者列表时，用于判断能否接收社区事件的角色
    pub fn receives_community_events(&self) -> bool {
        matches!(self, Self::Member | Self::Admin | Self::Moderator)
    }
}

/// 社区实体
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Community {
    pub id: CommunityId,
    pub name: String,
    pub visibility: CommunityVisibility,
}

impl Community {
    pub fn new(id: CommunityId, name: impl Into<String>, visibility: CommunityVisibility) -> Self {
        Self {
            id,
            name: name.into(),
            visibility,
        }
    }

    /// 只有私有社区参与实时推送，公开社区的动态不推送
    pub fn supports_realtime(&self) -> bool {
        self.visibility == CommunityVisibility::Private
    }
}

/// 文章投稿到社区后的关联记录
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunityArticle {
    pub id: CommunityArticleId,
    pub article_id: ArticleId,
    pub community_id: CommunityId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_private_communities_support_realtime() {
        let private = Community::new(CommunityId(1), "lab", CommunityVisibility::Private);
        let public = Community::new(CommunityId(2), "open", CommunityVisibility::Public);
        let hidden = Community::new(CommunityId(3), "secret", CommunityVisibility::Hidden);

        assert!(private.supports_realtime());
        assert!(!public.supports_realtime());
        assert!(!hidden.supports_realtime());
    }

    #[test]
    fn visibility_parses_stored_values() {
        assert_eq!(
            "private".parse::<CommunityVisibility>().unwrap(),
            CommunityVisibility::Private
        );
        assert!("locked".parse::<CommunityVisibility>().is_err());
    }

    #[test]
    fn reviewers_do_not_receive_by_role_alone() {
        assert!(CommunityRole::Member.receives_community_events());
        assert!(CommunityRole::Admin.receives_community_events());
        assert!(CommunityRole::Moderator.receives_community_events());
        assert!(!CommunityRole::Reviewer.receives_community_events());
    }
}
