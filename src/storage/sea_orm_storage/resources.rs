//! 学习资源与收藏存储操作

use super::SeaOrmStorage;
use crate::entity::favorite_resources::{
    ActiveModel as FavoriteActiveModel, Column as FavoriteColumn, Entity as FavoriteResources,
};
use crate::entity::resources::{ActiveModel, Column, Entity as Resources, Relation};
use crate::errors::{PortalError, Result};
use crate::models::resources::{
    entities::{FavoriteResource, Resource},
    requests::{CreateResourceRequest, ResourceListQuery, UpdateResourceRequest},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, JoinType, QueryFilter, QueryOrder,
    QuerySelect, RelationTrait, Set,
};
use uuid::Uuid;

fn encode_tags(tags: &[String]) -> Result<String> {
    Ok(serde_json::to_string(tags)?)
}

impl SeaOrmStorage {
    /// 列出资源
    pub async fn list_resources_impl(&self, query: ResourceListQuery) -> Result<Vec<Resource>> {
        let limit = query.limit();
        let mut select = Resources::find();

        if let Some(resource_type) = query.resource_type {
            select = select.filter(Column::ResourceType.eq(resource_type));
        }

        // 标签以 JSON 数组保存，按带引号的完整标签匹配
        if let Some(tag) = query.tag
            && !tag.trim().is_empty()
        {
            let needle = serde_json::to_string(tag.trim())?;
            select = select.filter(Column::Tags.contains(&needle));
        }

        let result = select
            .order_by_desc(Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询资源列表失败: {e}")))?;

        Ok(result.into_iter().map(|m| m.into_resource()).collect())
    }

    /// 按标题、描述、标签搜索
    pub async fn search_resources_impl(&self, keyword: &str, limit: u64) -> Result<Vec<Resource>> {
        let keyword = keyword.trim();
        // 标签只做整项匹配
        let tag_needle = serde_json::to_string(keyword)?;

        let result = Resources::find()
            .filter(
                Condition::any()
                    .add(Column::Title.contains(keyword))
                    .add(Column::Description.contains(keyword))
                    .add(Column::Tags.contains(&tag_needle)),
            )
            .order_by_desc(Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("搜索资源失败: {e}")))?;

        Ok(result.into_iter().map(|m| m.into_resource()).collect())
    }

    /// 通过 ID 获取资源
    pub async fn get_resource_by_id_impl(&self, resource_id: Uuid) -> Result<Option<Resource>> {
        let result = Resources::find_by_id(resource_id)
            .one(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询资源失败: {e}")))?;

        Ok(result.map(|m| m.into_resource()))
    }

    /// 创建资源
    pub async fn create_resource_impl(
        &self,
        uploaded_by: Uuid,
        req: CreateResourceRequest,
    ) -> Result<Resource> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(req.title),
            description: Set(req.description),
            url: Set(req.url),
            file_path: Set(req.file_path),
            resource_type: Set(req.resource_type),
            tags: Set(encode_tags(&req.tags)?),
            uploaded_by: Set(Some(uploaded_by)),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("创建资源失败: {e}")))?;

        Ok(result.into_resource())
    }

    /// 更新资源
    pub async fn update_resource_impl(
        &self,
        resource_id: Uuid,
        update: UpdateResourceRequest,
    ) -> Result<Option<Resource>> {
        if self.get_resource_by_id_impl(resource_id).await?.is_none() {
            return Ok(None);
        }

        let now = chrono::Utc::now().timestamp();
        let mut model = ActiveModel {
            id: Set(resource_id),
            updated_at: Set(now),
            ..Default::default()
        };

        if let Some(title) = update.title {
            model.title = Set(title);
        }
        if let Some(description) = update.description {
            model.description = Set(Some(description));
        }
        if let Some(url) = update.url {
            model.url = Set(Some(url));
        }
        if let Some(file_path) = update.file_path {
            model.file_path = Set(Some(file_path));
        }
        if let Some(resource_type) = update.resource_type {
            model.resource_type = Set(Some(resource_type));
        }
        if let Some(tags) = update.tags {
            model.tags = Set(encode_tags(&tags)?);
        }

        let updated = model
            .update(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("更新资源失败: {e}")))?;

        Ok(Some(updated.into_resource()))
    }

    /// 删除资源
    pub async fn delete_resource_impl(&self, resource_id: Uuid) -> Result<bool> {
        let result = Resources::delete_by_id(resource_id)
            .exec(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("删除资源失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 收藏资源，已收藏时返回原记录
    pub async fn add_favorite_impl(
        &self,
        user_id: Uuid,
        resource_id: Uuid,
    ) -> Result<FavoriteResource> {
        let existing = FavoriteResources::find_by_id((user_id, resource_id))
            .one(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询收藏失败: {e}")))?;

        if let Some(favorite) = existing {
            return Ok(favorite.into_favorite());
        }

        let favorite = FavoriteActiveModel {
            user_id: Set(user_id),
            resource_id: Set(resource_id),
            created_at: Set(chrono::Utc::now().timestamp()),
        }
        .insert(&self.db)
        .await
        .map_err(|e| PortalError::database_operation(format!("收藏资源失败: {e}")))?;

        Ok(favorite.into_favorite())
    }

    /// 取消收藏
    pub async fn remove_favorite_impl(&self, user_id: Uuid, resource_id: Uuid) -> Result<bool> {
        let result = FavoriteResources::delete_by_id((user_id, resource_id))
            .exec(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("取消收藏失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 列出用户收藏的资源
    pub async fn list_favorite_resources_impl(&self, user_id: Uuid) -> Result<Vec<Resource>> {
        let result = Resources::find()
            .join(JoinType::InnerJoin, Relation::Favorites.def())
            .filter(FavoriteColumn::UserId.eq(user_id))
            .order_by_desc(FavoriteColumn::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询收藏列表失败: {e}")))?;

        Ok(result.into_iter().map(|m| m.into_resource()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::{entities::UserRole, requests::ProvisionProfileRequest};

    async fn mentor(storage: &SeaOrmStorage) -> Uuid {
        let id = Uuid::new_v4();
        storage
            .provision_user_impl(ProvisionProfileRequest {
                id,
                email: format!("{id}@example.com"),
                name: None,
                avatar_url: None,
                role: UserRole::Mentor,
            })
            .await
            .unwrap()
            .id
    }

    fn resource(title: &str, tags: &[&str]) -> CreateResourceRequest {
        CreateResourceRequest {
            title: title.into(),
            resource_type: Some("article".into()),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_tag_filter_and_search() {
        let storage = SeaOrmStorage::in_memory().await;
        let owner = mentor(&storage).await;

        storage
            .create_resource_impl(owner, resource("Tea ceremony", &["japan", "culture"]))
            .await
            .unwrap();
        storage
            .create_resource_impl(owner, resource("Clean water", &["sdgs"]))
            .await
            .unwrap();

        let japan = storage
            .list_resources_impl(ResourceListQuery {
                tag: Some("japan".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(japan.len(), 1);
        assert_eq!(japan[0].tags, vec!["japan", "culture"]);

        let found = storage.search_resources_impl("water", 10).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Clean water");
    }

    #[tokio::test]
    async fn test_search_matches_whole_tags_only() {
        let storage = SeaOrmStorage::in_memory().await;
        let owner = mentor(&storage).await;

        storage
            .create_resource_impl(owner, resource("Festival guide", &["matsuri"]))
            .await
            .unwrap();

        let by_tag = storage.search_resources_impl("matsuri", 10).await.unwrap();
        assert_eq!(by_tag.len(), 1);

        // 标签中的片段不算命中
        assert!(storage.search_resources_impl("tsu", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_favorite_is_idempotent() {
        let storage = SeaOrmStorage::in_memory().await;
        let owner = mentor(&storage).await;
        let res = storage
            .create_resource_impl(owner, resource("Origami", &[]))
            .await
            .unwrap();

        storage.add_favorite_impl(owner, res.id).await.unwrap();
        storage.add_favorite_impl(owner, res.id).await.unwrap();
        assert_eq!(
            storage.list_favorite_resources_impl(owner).await.unwrap().len(),
            1
        );

        assert!(storage.remove_favorite_impl(owner, res.id).await.unwrap());
        assert!(
            storage
                .list_favorite_resources_impl(owner)
                .await
                .unwrap()
                .is_empty()
        );
    }
}
