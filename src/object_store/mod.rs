//! 对象存储
//!
//! 各 bucket 的对象读写都通过 [`ObjectStore`]，权限判断在调用前由
//! [`crate::authz::can_access_object`] 完成。

pub mod local;

use std::sync::Arc;

use crate::config::AppConfig;
use crate::errors::Result;
use crate::models::objects::responses::ObjectInfo;

pub use local::LocalObjectStore;

#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    /// 写入对象，已存在时覆盖，返回写入字节数
    async fn put(&self, bucket: &str, path: &str, data: Vec<u8>) -> Result<u64>;
    /// 读取对象，不存在时返回 None
    async fn get(&self, bucket: &str, path: &str) -> Result<Option<Vec<u8>>>;
    /// 删除对象，返回是否确实删除
    async fn delete(&self, bucket: &str, path: &str) -> Result<bool>;
    /// 列出目录下的对象，按创建时间倒序
    async fn list(
        &self,
        bucket: &str,
        folder: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<ObjectInfo>>;
}

pub async fn create_object_store() -> Result<Arc<dyn ObjectStore>> {
    let config = AppConfig::get();
    let store = LocalObjectStore::new(&config.upload.dir).await?;
    Ok(Arc::new(store))
}
