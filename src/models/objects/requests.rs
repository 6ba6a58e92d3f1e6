use serde::Deserialize;
use ts_rs::TS;

// 申请上传地址
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/storage.ts")]
pub struct UploadUrlRequest {
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub file_type: String,
    #[serde(default)]
    pub bucket: String,
    pub folder: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/storage.ts")]
pub struct ObjectListQuery {
    pub folder: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl ObjectListQuery {
    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(100).clamp(1, 1000)
    }

    pub fn offset(&self) -> usize {
        self.offset.unwrap_or(0)
    }
}
