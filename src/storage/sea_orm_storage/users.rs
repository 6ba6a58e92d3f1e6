//! 用户资料存储操作

use super::SeaOrmStorage;
use crate::entity::users::{ActiveModel, Column, Entity as Users};
use crate::errors::{PortalError, Result};
use crate::models::users::{
    entities::{User, UserRole},
    requests::{ProvisionProfileRequest, UpdateProfileRequest},
};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use tracing::warn;
use uuid::Uuid;

impl SeaOrmStorage {
    /// 通过 ID 获取用户
    pub async fn get_user_by_id_impl(&self, id: Uuid) -> Result<Option<User>> {
        let result = Users::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询用户失败: {e}")))?;

        Ok(result.map(|m| m.into_user()))
    }

    /// 批量获取用户
    pub async fn get_users_by_ids_impl(&self, ids: &[Uuid]) -> Result<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let result = Users::find()
            .filter(Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("批量查询用户失败: {e}")))?;

        Ok(result.into_iter().map(|m| m.into_user()).collect())
    }

    /// 首次登录创建资料
    pub async fn provision_user_impl(&self, profile: ProvisionProfileRequest) -> Result<User> {
        if let Some(existing) = self.get_user_by_id_impl(profile.id).await? {
            return Ok(existing);
        }

        let now = chrono::Utc::now().timestamp();
        let model = ActiveModel {
            id: Set(profile.id),
            email: Set(profile.email),
            name: Set(profile.name),
            avatar_url: Set(profile.avatar_url),
            role: Set(profile.role.to_string()),
            bio: Set(None),
            country: Set(None),
            school: Set(None),
            group_id: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        match model.insert(&self.db).await {
            Ok(created) => Ok(created.into_user()),
            Err(e) => {
                // 并发请求可能已经创建了同一份资料
                warn!("Profile insert for {} failed, re-reading: {}", profile.id, e);
                self.get_user_by_id_impl(profile.id).await?.ok_or_else(|| {
                    PortalError::database_operation(format!("创建用户资料失败: {e}"))
                })
            }
        }
    }

    /// 更新个人资料
    pub async fn update_profile_impl(
        &self,
        id: Uuid,
        update: UpdateProfileRequest,
    ) -> Result<Option<User>> {
        // 先检查用户是否存在
        if self.get_user_by_id_impl(id).await?.is_none() {
            return Ok(None);
        }

        let now = chrono::Utc::now().timestamp();

        let mut model = ActiveModel {
            id: Set(id),
            updated_at: Set(now),
            ..Default::default()
        };

        if let Some(name) = update.name {
            model.name = Set(Some(name));
        }
        if let Some(avatar_url) = update.avatar_url {
            model.avatar_url = Set(Some(avatar_url));
        }
        if let Some(bio) = update.bio {
            model.bio = Set(Some(bio));
        }
        if let Some(country) = update.country {
            model.country = Set(Some(country));
        }
        if let Some(school) = update.school {
            model.school = Set(Some(school));
        }

        let updated = model
            .update(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("更新用户资料失败: {e}")))?;

        Ok(Some(updated.into_user()))
    }

    /// 列出用户
    pub async fn list_users_impl(&self, role: Option<UserRole>) -> Result<Vec<User>> {
        let mut select = Users::find();

        if let Some(role) = role {
            select = select.filter(Column::Role.eq(role.to_string()));
        }

        let result = select
            .order_by_desc(Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询用户列表失败: {e}")))?;

        Ok(result.into_iter().map(|m| m.into_user()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(role: UserRole) -> ProvisionProfileRequest {
        let id = Uuid::new_v4();
        ProvisionProfileRequest {
            id,
            email: format!("{id}@example.com"),
            name: Some("Test".into()),
            avatar_url: None,
            role,
        }
    }

    #[tokio::test]
    async fn test_provision_is_idempotent() {
        let storage = SeaOrmStorage::in_memory().await;
        let req = profile(UserRole::Student);
        let first = storage.provision_user_impl(req.clone()).await.unwrap();

        let mut again = req;
        again.role = UserRole::Admin;
        let second = storage.provision_user_impl(again).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.role, UserRole::Student);
    }

    #[tokio::test]
    async fn test_update_profile_and_role_filter() {
        let storage = SeaOrmStorage::in_memory().await;
        let student = storage
            .provision_user_impl(profile(UserRole::Student))
            .await
            .unwrap();
        storage
            .provision_user_impl(profile(UserRole::Mentor))
            .await
            .unwrap();

        let updated = storage
            .update_profile_impl(
                student.id,
                UpdateProfileRequest {
                    country: Some("Japan".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.country.as_deref(), Some("Japan"));
        assert_eq!(updated.name.as_deref(), Some("Test"));

        let mentors = storage.list_users_impl(Some(UserRole::Mentor)).await.unwrap();
        assert_eq!(mentors.len(), 1);
        assert_eq!(storage.list_users_impl(None).await.unwrap().len(), 2);

        let missing = storage
            .update_profile_impl(Uuid::new_v4(), UpdateProfileRequest::default())
            .await
            .unwrap();
        assert!(missing.is_none());
    }
}
