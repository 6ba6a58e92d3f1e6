use serde::Deserialize;
use ts_rs::TS;

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/resource.ts")]
pub struct CreateResourceRequest {
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
    pub url: Option<String>,
    pub file_path: Option<String>,
    #[serde(rename = "type")]
    pub resource_type: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/resource.ts")]
pub struct UpdateResourceRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub file_path: Option<String>,
    #[serde(rename = "type")]
    pub resource_type: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/resource.ts")]
pub struct ResourceListQuery {
    #[serde(rename = "type")]
    pub resource_type: Option<String>,
    pub tag: Option<String>,
    pub limit: Option<u64>,
}

impl ResourceListQuery {
    pub fn limit(&self) -> u64 {
        self.limit.unwrap_or(20).clamp(1, 100)
    }
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/resource.ts")]
pub struct ResourceSearchQuery {
    pub q: Option<String>,
    pub category: Option<String>,
    pub limit: Option<usize>,
}

impl ResourceSearchQuery {
    pub fn category(&self) -> &str {
        self.category.as_deref().unwrap_or("general")
    }

    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(10).clamp(1, 50)
    }
}
