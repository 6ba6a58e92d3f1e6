use serde::Deserialize;
use ts_rs::TS;
use uuid::Uuid;

use super::entities::MessageType;

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/message.ts")]
pub struct MessageListQuery {
    pub group_id: Option<Uuid>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl MessageListQuery {
    pub fn limit(&self) -> u64 {
        self.limit.unwrap_or(50).clamp(1, 200)
    }

    pub fn offset(&self) -> u64 {
        self.offset.unwrap_or(0)
    }
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/message.ts")]
pub struct CreateMessageRequest {
    pub group_id: Option<Uuid>,
    pub content: Option<String>,
    pub message_type: Option<MessageType>,
    pub file_url: Option<String>,
}

impl CreateMessageRequest {
    /// 内容和附件至少要有一个
    pub fn has_payload(&self) -> bool {
        let has_content = self
            .content
            .as_deref()
            .is_some_and(|c| !c.trim().is_empty());
        let has_file = self.file_url.as_deref().is_some_and(|f| !f.is_empty());
        has_content || has_file
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_payload_required() {
        assert!(!CreateMessageRequest::default().has_payload());
        let blank = CreateMessageRequest {
            content: Some("   ".into()),
            ..Default::default()
        };
        assert!(!blank.has_payload());
        let file_only = CreateMessageRequest {
            file_url: Some("works/u1/a.png".into()),
            ..Default::default()
        };
        assert!(file_only.has_payload());
    }

    #[test]
    fn test_list_defaults() {
        let q = MessageListQuery::default();
        assert_eq!(q.limit(), 50);
        assert_eq!(q.offset(), 0);
    }
}
