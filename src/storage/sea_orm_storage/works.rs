//! 作品与反馈存储操作

use super::SeaOrmStorage;
use crate::entity::feedback::{
    ActiveModel as FeedbackActiveModel, Column as FeedbackColumn, Entity as FeedbackEntity,
};
use crate::entity::works::{ActiveModel, Column, Entity as Works};
use crate::errors::{PortalError, Result};
use crate::models::works::{
    entities::{Feedback, Work, WorkStatus},
    requests::{CreateWorkRequest, UpdateWorkRequest, WorkFilter},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

impl SeaOrmStorage {
    /// 创建作品
    pub async fn create_work_impl(
        &self,
        user_id: Uuid,
        req: CreateWorkRequest,
        status: WorkStatus,
    ) -> Result<Work> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            group_id: Set(req.group_id),
            title: Set(req.title),
            description: Set(req.description),
            content: Set(req.content),
            work_type: Set(req.work_type),
            file_url: Set(req.file_url),
            status: Set(status.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("创建作品失败: {e}")))?;

        Ok(result.into_work())
    }

    /// 通过 ID 获取作品
    pub async fn get_work_by_id_impl(&self, work_id: Uuid) -> Result<Option<Work>> {
        let result = Works::find_by_id(work_id)
            .one(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询作品失败: {e}")))?;

        Ok(result.map(|m| m.into_work()))
    }

    /// 按条件列出作品，按创建时间倒序
    pub async fn list_works_impl(&self, filter: WorkFilter) -> Result<Vec<Work>> {
        let mut select = Works::find();

        if let Some(user_id) = filter.user_id {
            select = select.filter(Column::UserId.eq(user_id));
        }

        if let Some(group_ids) = filter.group_ids {
            if group_ids.is_empty() {
                return Ok(Vec::new());
            }
            select = select.filter(Column::GroupId.is_in(group_ids));
        }

        if let Some(work_type) = filter.work_type {
            select = select.filter(Column::WorkType.eq(work_type));
        }

        if let Some(status) = filter.status {
            select = select.filter(Column::Status.eq(status.to_string()));
        }

        let result = select
            .order_by_desc(Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询作品列表失败: {e}")))?;

        Ok(result.into_iter().map(|m| m.into_work()).collect())
    }

    /// 更新作品
    pub async fn update_work_impl(
        &self,
        work_id: Uuid,
        update: UpdateWorkRequest,
    ) -> Result<Option<Work>> {
        // 先检查作品是否存在
        if self.get_work_by_id_impl(work_id).await?.is_none() {
            return Ok(None);
        }

        let next_status = update.next_status();
        let now = chrono::Utc::now().timestamp();
        let mut model = ActiveModel {
            id: Set(work_id),
            updated_at: Set(now),
            ..Default::default()
        };

        // 必填列忽略 null，可空列收到 null 时清空
        if let Some(Some(title)) = update.title {
            model.title = Set(title);
        }
        if let Some(description) = update.description {
            model.description = Set(description);
        }
        if let Some(content) = update.content {
            model.content = Set(content);
        }
        if let Some(Some(work_type)) = update.work_type {
            model.work_type = Set(work_type);
        }
        if let Some(file_url) = update.file_url {
            model.file_url = Set(file_url);
        }
        if let Some(group_id) = update.group_id {
            model.group_id = Set(group_id);
        }
        if let Some(status) = next_status {
            model.status = Set(status.to_string());
        }

        let updated = model
            .update(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("更新作品失败: {e}")))?;

        Ok(Some(updated.into_work()))
    }

    /// 删除作品
    pub async fn delete_work_impl(&self, work_id: Uuid) -> Result<bool> {
        let result = Works::delete_by_id(work_id)
            .exec(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("删除作品失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 批量获取作品反馈
    pub async fn list_feedback_for_works_impl(&self, work_ids: &[Uuid]) -> Result<Vec<Feedback>> {
        if work_ids.is_empty() {
            return Ok(Vec::new());
        }

        let result = FeedbackEntity::find()
            .filter(FeedbackColumn::WorkId.is_in(work_ids.iter().copied()))
            .order_by_asc(FeedbackColumn::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询反馈失败: {e}")))?;

        Ok(result.into_iter().map(|m| m.into_feedback()).collect())
    }

    /// 写入反馈，同时把作品标记为已批阅
    pub async fn create_feedback_impl(
        &self,
        work_id: Uuid,
        reviewer_id: Uuid,
        comment: String,
        rating: Option<i32>,
    ) -> Result<Feedback> {
        let now = chrono::Utc::now().timestamp();

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| PortalError::database_operation(format!("开启事务失败: {e}")))?;

        let feedback = FeedbackActiveModel {
            id: Set(Uuid::new_v4()),
            work_id: Set(work_id),
            reviewer_id: Set(reviewer_id),
            comment: Set(comment),
            rating: Set(rating),
            created_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(|e| PortalError::database_operation(format!("创建反馈失败: {e}")))?;

        ActiveModel {
            id: Set(work_id),
            status: Set(WorkStatus::Reviewed.to_string()),
            updated_at: Set(now),
            ..Default::default()
        }
        .update(&txn)
        .await
        .map_err(|e| PortalError::database_operation(format!("更新作品状态失败: {e}")))?;

        txn.commit()
            .await
            .map_err(|e| PortalError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(feedback.into_feedback())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::{entities::UserRole, requests::ProvisionProfileRequest};

    async fn user_id(storage: &SeaOrmStorage, role: UserRole) -> Uuid {
        let id = Uuid::new_v4();
        storage
            .provision_user_impl(ProvisionProfileRequest {
                id,
                email: format!("{id}@example.com"),
                name: None,
                avatar_url: None,
                role,
            })
            .await
            .unwrap()
            .id
    }

    fn draft(title: &str) -> CreateWorkRequest {
        CreateWorkRequest {
            title: title.into(),
            work_type: "report".into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_feedback_marks_reviewed_and_is_repeatable() {
        let storage = SeaOrmStorage::in_memory().await;
        let student = user_id(&storage, UserRole::Student).await;
        let mentor = user_id(&storage, UserRole::Mentor).await;

        let work = storage
            .create_work_impl(student, draft("Day 1"), WorkStatus::Submitted)
            .await
            .unwrap();
        assert_eq!(work.status, WorkStatus::Submitted);

        storage
            .create_feedback_impl(work.id, mentor, "Nice".into(), Some(5))
            .await
            .unwrap();
        let reviewed = storage.get_work_by_id_impl(work.id).await.unwrap().unwrap();
        assert_eq!(reviewed.status, WorkStatus::Reviewed);

        storage
            .create_feedback_impl(work.id, mentor, "Still nice".into(), None)
            .await
            .unwrap();
        let again = storage.get_work_by_id_impl(work.id).await.unwrap().unwrap();
        assert_eq!(again.status, WorkStatus::Reviewed);

        let feedback = storage.list_feedback_for_works_impl(&[work.id]).await.unwrap();
        assert_eq!(feedback.len(), 2);
    }

    #[tokio::test]
    async fn test_list_works_filters() {
        let storage = SeaOrmStorage::in_memory().await;
        let a = user_id(&storage, UserRole::Student).await;
        let b = user_id(&storage, UserRole::Student).await;

        storage
            .create_work_impl(a, draft("a1"), WorkStatus::Submitted)
            .await
            .unwrap();
        storage
            .create_work_impl(b, draft("b1"), WorkStatus::Submitted)
            .await
            .unwrap();

        let only_a = storage
            .list_works_impl(WorkFilter {
                user_id: Some(a),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(only_a.len(), 1);
        assert_eq!(only_a[0].user_id, a);

        // 空的小组范围直接返回空列表
        let none = storage
            .list_works_impl(WorkFilter {
                group_ids: Some(vec![]),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(none.is_empty());

        let reviewed = storage
            .list_works_impl(WorkFilter {
                status: Some(WorkStatus::Reviewed),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(reviewed.is_empty());
    }
}
