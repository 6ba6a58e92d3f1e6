use serde::Serialize;
use ts_rs::TS;

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/storage.ts")]
pub struct UploadUrlResponse {
    pub upload_url: String,
    pub file_path: String,
    pub token: String,
    pub expires_in: i64,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/storage.ts")]
pub struct DownloadUrlResponse {
    pub download_url: String,
    pub expires_in: i64,
}

// 对象元数据
#[derive(Debug, Clone, Serialize, PartialEq, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/storage.ts")]
pub struct ObjectInfo {
    pub name: String,
    pub path: String,
    pub size: u64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/storage.ts")]
pub struct ObjectListResponse {
    pub files: Vec<ObjectInfo>,
    pub bucket: String,
    pub folder: String,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/storage.ts")]
pub struct UploadedObject {
    pub bucket: String,
    pub path: String,
    pub size: u64,
}
