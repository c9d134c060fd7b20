use domain::{CommunityId, UserId};
use serde::{Deserialize, Serialize};

use crate::realtime::EventCursor;

/// 注册队列成功后返回给客户端的信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterQueueDto {
    pub queue_id: String,
    pub last_event_id: EventCursor,
    pub communities: Vec<CommunityId>,
}

/// 当前用户的实时推送状态
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealtimeStatusDto {
    pub user_id: UserId,
    pub communities: Vec<CommunityId>,
    pub realtime_enabled: bool,
    /// 客户端建立流式连接使用的相对路径
    pub tornado_url: String,
}
