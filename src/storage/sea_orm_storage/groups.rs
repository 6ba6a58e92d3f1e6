//! 小组存储操作

use super::SeaOrmStorage;
use crate::entity::group_members::{
    ActiveModel as MemberActiveModel, Column as MemberColumn, Entity as GroupMembers,
};
use crate::entity::groups::{ActiveModel, Column, Entity as Groups, Relation as GroupRelation};
use crate::entity::users::{Entity as Users, Relation as UserRelation};
use crate::errors::{PortalError, Result};
use crate::models::groups::{
    entities::{Group, GroupMember},
    requests::{CreateGroupRequest, UpdateGroupRequest},
};
use crate::models::users::entities::User;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, JoinType, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, RelationTrait, Set, TransactionTrait,
};
use uuid::Uuid;

impl SeaOrmStorage {
    /// 列出所有小组
    pub async fn list_groups_impl(&self) -> Result<Vec<Group>> {
        let result = Groups::find()
            .order_by_desc(Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询小组列表失败: {e}")))?;

        Ok(result.into_iter().map(|m| m.into_group()).collect())
    }

    /// 列出导师负责的小组
    pub async fn list_groups_by_mentor_impl(&self, mentor_id: Uuid) -> Result<Vec<Group>> {
        let result = Groups::find()
            .filter(Column::MentorId.eq(mentor_id))
            .order_by_desc(Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询导师小组失败: {e}")))?;

        Ok(result.into_iter().map(|m| m.into_group()).collect())
    }

    /// 列出学生加入的小组
    pub async fn list_groups_by_student_impl(&self, student_id: Uuid) -> Result<Vec<Group>> {
        let result = Groups::find()
            .join(JoinType::InnerJoin, GroupRelation::GroupMembers.def())
            .filter(MemberColumn::StudentId.eq(student_id))
            .order_by_desc(Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询学生小组失败: {e}")))?;

        Ok(result.into_iter().map(|m| m.into_group()).collect())
    }

    /// 通过 ID 获取小组
    pub async fn get_group_by_id_impl(&self, group_id: Uuid) -> Result<Option<Group>> {
        let result = Groups::find_by_id(group_id)
            .one(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询小组失败: {e}")))?;

        Ok(result.map(|m| m.into_group()))
    }

    /// 创建小组及初始成员
    pub async fn create_group_impl(&self, req: CreateGroupRequest) -> Result<Group> {
        let now = chrono::Utc::now().timestamp();
        let group_id = Uuid::new_v4();

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| PortalError::database_operation(format!("开启事务失败: {e}")))?;

        let model = ActiveModel {
            id: Set(group_id),
            name: Set(req.name),
            description: Set(req.description),
            mentor_id: Set(req.mentor_id),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let group = model
            .insert(&txn)
            .await
            .map_err(|e| PortalError::database_operation(format!("创建小组失败: {e}")))?;

        let mut seen = std::collections::HashSet::new();
        for student_id in req.student_ids {
            if !seen.insert(student_id) {
                continue;
            }
            MemberActiveModel {
                id: Set(Uuid::new_v4()),
                group_id: Set(group_id),
                student_id: Set(student_id),
                joined_at: Set(now),
            }
            .insert(&txn)
            .await
            .map_err(|e| PortalError::database_operation(format!("添加小组成员失败: {e}")))?;
        }

        txn.commit()
            .await
            .map_err(|e| PortalError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(group.into_group())
    }

    /// 更新小组信息
    pub async fn update_group_impl(
        &self,
        group_id: Uuid,
        update: UpdateGroupRequest,
    ) -> Result<Option<Group>> {
        // 先检查小组是否存在
        if self.get_group_by_id_impl(group_id).await?.is_none() {
            return Ok(None);
        }

        let now = chrono::Utc::now().timestamp();
        let mut model = ActiveModel {
            id: Set(group_id),
            updated_at: Set(now),
            ..Default::default()
        };

        if let Some(name) = update.name {
            model.name = Set(name);
        }
        if let Some(description) = update.description {
            model.description = Set(Some(description));
        }
        if let Some(mentor_id) = update.mentor_id {
            model.mentor_id = Set(Some(mentor_id));
        }

        let updated = model
            .update(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("更新小组失败: {e}")))?;

        Ok(Some(updated.into_group()))
    }

    /// 删除小组
    pub async fn delete_group_impl(&self, group_id: Uuid) -> Result<bool> {
        let result = Groups::delete_by_id(group_id)
            .exec(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("删除小组失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 添加小组成员
    pub async fn add_group_member_impl(
        &self,
        group_id: Uuid,
        student_id: Uuid,
    ) -> Result<GroupMember> {
        let existing = GroupMembers::find()
            .filter(MemberColumn::GroupId.eq(group_id))
            .filter(MemberColumn::StudentId.eq(student_id))
            .one(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询小组成员失败: {e}")))?;

        if let Some(member) = existing {
            return Ok(member.into_group_member());
        }

        let member = MemberActiveModel {
            id: Set(Uuid::new_v4()),
            group_id: Set(group_id),
            student_id: Set(student_id),
            joined_at: Set(chrono::Utc::now().timestamp()),
        }
        .insert(&self.db)
        .await
        .map_err(|e| PortalError::database_operation(format!("添加小组成员失败: {e}")))?;

        Ok(member.into_group_member())
    }

    /// 移除小组成员
    pub async fn remove_group_member_impl(&self, group_id: Uuid, student_id: Uuid) -> Result<bool> {
        let result = GroupMembers::delete_many()
            .filter(MemberColumn::GroupId.eq(group_id))
            .filter(MemberColumn::StudentId.eq(student_id))
            .exec(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("移除小组成员失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 列出小组成员资料
    pub async fn list_group_members_impl(&self, group_id: Uuid) -> Result<Vec<User>> {
        let result = Users::find()
            .join(JoinType::InnerJoin, UserRelation::GroupMembers.def())
            .filter(MemberColumn::GroupId.eq(group_id))
            .order_by_asc(MemberColumn::JoinedAt)
            .all(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询小组成员失败: {e}")))?;

        Ok(result.into_iter().map(|m| m.into_user()).collect())
    }

    /// 是否为小组成员
    pub async fn is_group_member_impl(&self, group_id: Uuid, user_id: Uuid) -> Result<bool> {
        let count = GroupMembers::find()
            .filter(MemberColumn::GroupId.eq(group_id))
            .filter(MemberColumn::StudentId.eq(user_id))
            .count(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询小组成员失败: {e}")))?;

        Ok(count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::{entities::UserRole, requests::ProvisionProfileRequest};

    async fn user(storage: &SeaOrmStorage, role: UserRole) -> User {
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
    }

    #[tokio::test]
    async fn test_group_membership_scopes() {
        let storage = SeaOrmStorage::in_memory().await;
        let mentor = user(&storage, UserRole::Mentor).await;
        let student = user(&storage, UserRole::Student).await;
        let outsider = user(&storage, UserRole::Student).await;

        let group = storage
            .create_group_impl(CreateGroupRequest {
                name: "Kyoto".into(),
                description: None,
                mentor_id: Some(mentor.id),
                student_ids: vec![student.id, student.id],
            })
            .await
            .unwrap();

        assert!(storage.is_group_member_impl(group.id, student.id).await.unwrap());
        assert!(!storage.is_group_member_impl(group.id, outsider.id).await.unwrap());
        assert_eq!(storage.list_group_members_impl(group.id).await.unwrap().len(), 1);
        assert_eq!(
            storage.list_groups_by_mentor_impl(mentor.id).await.unwrap().len(),
            1
        );
        assert_eq!(
            storage.list_groups_by_student_impl(student.id).await.unwrap().len(),
            1
        );
        assert!(
            storage
                .list_groups_by_student_impl(outsider.id)
                .await
                .unwrap()
                .is_empty()
        );

        // 重复添加返回同一条成员记录
        let first = storage.add_group_member_impl(group.id, outsider.id).await.unwrap();
        let second = storage.add_group_member_impl(group.id, outsider.id).await.unwrap();
        assert_eq!(first.id, second.id);

        assert!(storage.remove_group_member_impl(group.id, outsider.id).await.unwrap());
        assert!(!storage.remove_group_member_impl(group.id, outsider.id).await.unwrap());
    }
}
