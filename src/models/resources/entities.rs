use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

// 学习资源
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/resource.ts")]
pub struct Resource {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub url: Option<String>,
    pub file_path: Option<String>,
    #[serde(rename = "type")]
    pub resource_type: Option<String>,
    pub tags: Vec<String>,
    pub uploaded_by: Option<Uuid>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

// 收藏记录
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/resource.ts")]
pub struct FavoriteResource {
    pub user_id: Uuid,
    pub resource_id: Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
