use serde::Serialize;
use ts_rs::TS;
use uuid::Uuid;

use super::entities::Message;
use crate::models::users::entities::User;

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/message.ts")]
pub struct MessageWithSender {
    #[serde(flatten)]
    pub message: Message,
    pub sender: Option<User>,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/message.ts")]
pub struct MessageListResponse {
    pub messages: Vec<MessageWithSender>,
    pub total: i64,
    pub group_id: Uuid,
}
