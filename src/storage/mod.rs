use std::sync::Arc;
use uuid::Uuid;

use crate::models::{
    groups::{
        entities::{Group, GroupMember},
        requests::{CreateGroupRequest, UpdateGroupRequest},
    },
    messages::{entities::Message, requests::CreateMessageRequest},
    resources::{
        entities::{FavoriteResource, Resource},
        requests::{CreateResourceRequest, ResourceListQuery, UpdateResourceRequest},
    },
    users::{
        entities::{User, UserRole},
        requests::{ProvisionProfileRequest, UpdateProfileRequest},
    },
    works::{
        entities::{Feedback, Work, WorkStatus},
        requests::{CreateWorkRequest, UpdateWorkRequest, WorkFilter},
    },
};

use crate::errors::Result;

pub mod sea_orm_storage;

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 用户资料
    // 通过ID获取用户资料
    async fn get_user_by_id(&self, id: Uuid) -> Result<Option<User>>;
    // 批量获取用户资料
    async fn get_users_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>>;
    // 首次登录时创建资料；已存在时返回现有资料
    async fn provision_user(&self, profile: ProvisionProfileRequest) -> Result<User>;
    // 更新个人资料
    async fn update_profile(&self, id: Uuid, update: UpdateProfileRequest)
    -> Result<Option<User>>;
    // 列出用户，可按角色筛选
    async fn list_users(&self, role: Option<UserRole>) -> Result<Vec<User>>;

    /// 小组
    async fn list_groups(&self) -> Result<Vec<Group>>;
    async fn list_groups_by_mentor(&self, mentor_id: Uuid) -> Result<Vec<Group>>;
    async fn list_groups_by_student(&self, student_id: Uuid) -> Result<Vec<Group>>;
    async fn get_group_by_id(&self, group_id: Uuid) -> Result<Option<Group>>;
    // 创建小组并写入成员（成员列表需由服务层过滤）
    async fn create_group(&self, group: CreateGroupRequest) -> Result<Group>;
    async fn update_group(
        &self,
        group_id: Uuid,
        update: UpdateGroupRequest,
    ) -> Result<Option<Group>>;
    async fn delete_group(&self, group_id: Uuid) -> Result<bool>;
    // 添加成员；已是成员时返回现有记录
    async fn add_group_member(&self, group_id: Uuid, student_id: Uuid) -> Result<GroupMember>;
    async fn remove_group_member(&self, group_id: Uuid, student_id: Uuid) -> Result<bool>;
    async fn list_group_members(&self, group_id: Uuid) -> Result<Vec<User>>;
    async fn is_group_member(&self, group_id: Uuid, user_id: Uuid) -> Result<bool>;

    /// 作品
    async fn create_work(
        &self,
        user_id: Uuid,
        work: CreateWorkRequest,
        status: WorkStatus,
    ) -> Result<Work>;
    async fn get_work_by_id(&self, work_id: Uuid) -> Result<Option<Work>>;
    async fn list_works(&self, filter: WorkFilter) -> Result<Vec<Work>>;
    async fn update_work(&self, work_id: Uuid, update: UpdateWorkRequest)
    -> Result<Option<Work>>;
    async fn delete_work(&self, work_id: Uuid) -> Result<bool>;
    async fn list_feedback_for_works(&self, work_ids: &[Uuid]) -> Result<Vec<Feedback>>;
    // 写入反馈并把作品标记为已批阅
    async fn create_feedback(
        &self,
        work_id: Uuid,
        reviewer_id: Uuid,
        comment: String,
        rating: Option<i32>,
    ) -> Result<Feedback>;

    /// 学习资源
    async fn list_resources(&self, query: ResourceListQuery) -> Result<Vec<Resource>>;
    async fn search_resources(&self, keyword: &str, limit: u64) -> Result<Vec<Resource>>;
    async fn get_resource_by_id(&self, resource_id: Uuid) -> Result<Option<Resource>>;
    async fn create_resource(
        &self,
        uploaded_by: Uuid,
        resource: CreateResourceRequest,
    ) -> Result<Resource>;
    async fn update_resource(
        &self,
        resource_id: Uuid,
        update: UpdateResourceRequest,
    ) -> Result<Option<Resource>>;
    async fn delete_resource(&self, resource_id: Uuid) -> Result<bool>;
    // 收藏（重复收藏不报错）
    async fn add_favorite(&self, user_id: Uuid, resource_id: Uuid) -> Result<FavoriteResource>;
    async fn remove_favorite(&self, user_id: Uuid, resource_id: Uuid) -> Result<bool>;
    async fn list_favorite_resources(&self, user_id: Uuid) -> Result<Vec<Resource>>;

    /// 小组消息
    // 按时间倒序分页，返回消息和总数
    async fn list_messages(
        &self,
        group_id: Uuid,
        limit: u64,
        offset: u64,
    ) -> Result<(Vec<Message>, i64)>;
    async fn create_message(
        &self,
        sender_id: Uuid,
        group_id: Uuid,
        message: CreateMessageRequest,
    ) -> Result<Message>;
    async fn get_message_by_id(&self, message_id: Uuid) -> Result<Option<Message>>;
    async fn delete_message(&self, message_id: Uuid) -> Result<bool>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
