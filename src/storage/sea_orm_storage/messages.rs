//! 小组消息存储操作

use super::SeaOrmStorage;
use crate::entity::messages::{ActiveModel, Column, Entity as Messages};
use crate::errors::{PortalError, Result};
use crate::models::messages::{entities::Message, requests::CreateMessageRequest};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

impl SeaOrmStorage {
    /// 分页列出小组消息（新消息在前）
    pub async fn list_messages_impl(
        &self,
        group_id: Uuid,
        limit: u64,
        offset: u64,
    ) -> Result<(Vec<Message>, i64)> {
        let total = Messages::find()
            .filter(Column::GroupId.eq(group_id))
            .count(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询消息总数失败: {e}")))?;

        let result = Messages::find()
            .filter(Column::GroupId.eq(group_id))
            .order_by_desc(Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询消息列表失败: {e}")))?;

        Ok((
            result.into_iter().map(|m| m.into_message()).collect(),
            total as i64,
        ))
    }

    /// 发送消息
    pub async fn create_message_impl(
        &self,
        sender_id: Uuid,
        group_id: Uuid,
        req: CreateMessageRequest,
    ) -> Result<Message> {
        let model = ActiveModel {
            id: Set(Uuid::new_v4()),
            group_id: Set(group_id),
            sender_id: Set(sender_id),
            content: Set(req.content),
            message_type: Set(req.message_type.unwrap_or_default().as_str().to_string()),
            file_url: Set(req.file_url),
            created_at: Set(chrono::Utc::now().timestamp()),
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("发送消息失败: {e}")))?;

        Ok(result.into_message())
    }

    /// 通过 ID 获取消息
    pub async fn get_message_by_id_impl(&self, message_id: Uuid) -> Result<Option<Message>> {
        let result = Messages::find_by_id(message_id)
            .one(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询消息失败: {e}")))?;

        Ok(result.map(|m| m.into_message()))
    }

    /// 删除消息
    pub async fn delete_message_impl(&self, message_id: Uuid) -> Result<bool> {
        let result = Messages::delete_by_id(message_id)
            .exec(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("删除消息失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }
}
