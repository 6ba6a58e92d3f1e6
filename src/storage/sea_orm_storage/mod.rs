//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod groups;
mod messages;
mod resources;
mod users;
mod works;

use crate::config::AppConfig;
use crate::errors::{PortalError, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 根据全局配置创建存储实例
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        Self::connect(
            &config.database.url,
            config.database.pool_size,
            config.database.timeout,
        )
        .await
    }

    /// 连接数据库并运行迁移
    pub async fn connect(url: &str, pool_size: u32, timeout: u64) -> Result<Self> {
        let db_url = Self::build_database_url(url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite:") {
            Self::connect_sqlite(&db_url, pool_size, timeout).await?
        } else {
            Self::connect_generic(&db_url, pool_size, timeout).await?
        };

        // 运行迁移
        Migrator::up(&db, None)
            .await
            .map_err(|e| PortalError::database_operation(format!("数据库迁移失败: {e}")))?;

        info!("SeaORM 存储初始化完成，数据库: {}", db_url);

        Ok(Self { db })
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(url: &str, pool_size: u32, timeout: u64) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let in_memory = url.contains(":memory:");

        let mut opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| PortalError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5))
            .pragma("temp_store", "memory");

        if !in_memory {
            opt = opt
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal)
                .pragma("cache_size", "-64000")
                .pragma("wal_autocheckpoint", "1000");
        }

        // 内存库每个连接各自独立，只能用单连接
        let max_connections = if in_memory { 1 } else { pool_size };

        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .min_connections(1)
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(timeout));
        pool_options = if in_memory {
            pool_options.idle_timeout(None).max_lifetime(None)
        } else {
            pool_options.idle_timeout(Duration::from_secs(300))
        };

        let pool = pool_options
            .connect_with(opt)
            .await
            .map_err(|e| PortalError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, pool_size: u32, timeout: u64) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(pool_size)
            .min_connections(1)
            .connect_timeout(Duration::from_secs(timeout))
            .acquire_timeout(Duration::from_secs(timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        Database::connect(opt)
            .await
            .map_err(|e| PortalError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite:") {
            Ok(url.to_string())
        } else if url == ":memory:" {
            Ok("sqlite::memory:".to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") {
            Ok(format!("sqlite://{}?mode=rwc", url))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(PortalError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }

    /// 测试用内存数据库
    #[cfg(test)]
    pub(crate) async fn in_memory() -> Self {
        Self::connect("sqlite::memory:", 1, 5)
            .await
            .expect("in-memory sqlite should open")
    }
}

// Storage trait 实现
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
use crate::storage::Storage;
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
impl Storage for SeaOrmStorage {
    // 用户资料
    async fn get_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        self.get_user_by_id_impl(id).await
    }

    async fn get_users_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>> {
        self.get_users_by_ids_impl(ids).await
    }

    async fn provision_user(&self, profile: ProvisionProfileRequest) -> Result<User> {
        self.provision_user_impl(profile).await
    }

    async fn update_profile(
        &self,
        id: Uuid,
        update: UpdateProfileRequest,
    ) -> Result<Option<User>> {
        self.update_profile_impl(id, update).await
    }

    async fn list_users(&self, role: Option<UserRole>) -> Result<Vec<User>> {
        self.list_users_impl(role).await
    }

    // 小组
    async fn list_groups(&self) -> Result<Vec<Group>> {
        self.list_groups_impl().await
    }

    async fn list_groups_by_mentor(&self, mentor_id: Uuid) -> Result<Vec<Group>> {
        self.list_groups_by_mentor_impl(mentor_id).await
    }

    async fn list_groups_by_student(&self, student_id: Uuid) -> Result<Vec<Group>> {
        self.list_groups_by_student_impl(student_id).await
    }

    async fn get_group_by_id(&self, group_id: Uuid) -> Result<Option<Group>> {
        self.get_group_by_id_impl(group_id).await
    }

    async fn create_group(&self, group: CreateGroupRequest) -> Result<Group> {
        self.create_group_impl(group).await
    }

    async fn update_group(
        &self,
        group_id: Uuid,
        update: UpdateGroupRequest,
    ) -> Result<Option<Group>> {
        self.update_group_impl(group_id, update).await
    }

    async fn delete_group(&self, group_id: Uuid) -> Result<bool> {
        self.delete_group_impl(group_id).await
    }

    async fn add_group_member(&self, group_id: Uuid, student_id: Uuid) -> Result<GroupMember> {
        self.add_group_member_impl(group_id, student_id).await
    }

    async fn remove_group_member(&self, group_id: Uuid, student_id: Uuid) -> Result<bool> {
        self.remove_group_member_impl(group_id, student_id).await
    }

    async fn list_group_members(&self, group_id: Uuid) -> Result<Vec<User>> {
        self.list_group_members_impl(group_id).await
    }

    async fn is_group_member(&self, group_id: Uuid, user_id: Uuid) -> Result<bool> {
        self.is_group_member_impl(group_id, user_id).await
    }

    // 作品
    async fn create_work(
        &self,
        user_id: Uuid,
        work: CreateWorkRequest,
        status: WorkStatus,
    ) -> Result<Work> {
        self.create_work_impl(user_id, work, status).await
    }

    async fn get_work_by_id(&self, work_id: Uuid) -> Result<Option<Work>> {
        self.get_work_by_id_impl(work_id).await
    }

    async fn list_works(&self, filter: WorkFilter) -> Result<Vec<Work>> {
        self.list_works_impl(filter).await
    }

    async fn update_work(
        &self,
        work_id: Uuid,
        update: UpdateWorkRequest,
    ) -> Result<Option<Work>> {
        self.update_work_impl(work_id, update).await
    }

    async fn delete_work(&self, work_id: Uuid) -> Result<bool> {
        self.delete_work_impl(work_id).await
    }

    async fn list_feedback_for_works(&self, work_ids: &[Uuid]) -> Result<Vec<Feedback>> {
        self.list_feedback_for_works_impl(work_ids).await
    }

    async fn create_feedback(
        &self,
        work_id: Uuid,
        reviewer_id: Uuid,
        comment: String,
        rating: Option<i32>,
    ) -> Result<Feedback> {
        self.create_feedback_impl(work_id, reviewer_id, comment, rating)
            .await
    }

    // 学习资源
    async fn list_resources(&self, query: ResourceListQuery) -> Result<Vec<Resource>> {
        self.list_resources_impl(query).await
    }

    async fn search_resources(&self, keyword: &str, limit: u64) -> Result<Vec<Resource>> {
        self.search_resources_impl(keyword, limit).await
    }

    async fn get_resource_by_id(&self, resource_id: Uuid) -> Result<Option<Resource>> {
        self.get_resource_by_id_impl(resource_id).await
    }

    async fn create_resource(
        &self,
        uploaded_by: Uuid,
        resource: CreateResourceRequest,
    ) -> Result<Resource> {
        self.create_resource_impl(uploaded_by, resource).await
    }

    async fn update_resource(
        &self,
        resource_id: Uuid,
        update: UpdateResourceRequest,
    ) -> Result<Option<Resource>> {
        self.update_resource_impl(resource_id, update).await
    }

    async fn delete_resource(&self, resource_id: Uuid) -> Result<bool> {
        self.delete_resource_impl(resource_id).await
    }

    async fn add_favorite(&self, user_id: Uuid, resource_id: Uuid) -> Result<FavoriteResource> {
        self.add_favorite_impl(user_id, resource_id).await
    }

    async fn remove_favorite(&self, user_id: Uuid, resource_id: Uuid) -> Result<bool> {
        self.remove_favorite_impl(user_id, resource_id).await
    }

    async fn list_favorite_resources(&self, user_id: Uuid) -> Result<Vec<Resource>> {
        self.list_favorite_resources_impl(user_id).await
    }

    // 小组消息
    async fn list_messages(
        &self,
        group_id: Uuid,
        limit: u64,
        offset: u64,
    ) -> Result<(Vec<Message>, i64)> {
        self.list_messages_impl(group_id, limit, offset).await
    }

    async fn create_message(
        &self,
        sender_id: Uuid,
        group_id: Uuid,
        message: CreateMessageRequest,
    ) -> Result<Message> {
        self.create_message_impl(sender_id, group_id, message).await
    }

    async fn get_message_by_id(&self, message_id: Uuid) -> Result<Option<Message>> {
        self.get_message_by_id_impl(message_id).await
    }

    async fn delete_message(&self, message_id: Uuid) -> Result<bool> {
        self.delete_message_impl(message_id).await
    }
}
