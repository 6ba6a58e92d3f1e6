use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::entities::Resource;

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/resource.ts")]
pub struct ResourceListResponse {
    pub items: Vec<Resource>,
}

// AI 推荐的外部资源
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/resource.ts")]
pub struct SuggestedResource {
    pub title: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type", default)]
    pub resource_type: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/resource.ts")]
pub struct ResourceSearchResponse {
    pub query: String,
    pub category: String,
    pub existing_resources: Vec<Resource>,
    pub ai_suggestions: Vec<SuggestedResource>,
    pub total: usize,
}

impl ResourceSearchResponse {
    /// 合并数据库结果与 AI 推荐，推荐数量受剩余名额限制
    pub fn combine(
        query: String,
        category: String,
        existing_resources: Vec<Resource>,
        mut ai_suggestions: Vec<SuggestedResource>,
        limit: usize,
    ) -> Self {
        let remaining = limit.saturating_sub(existing_resources.len());
        ai_suggestions.truncate(remaining);
        let total = existing_resources.len() + ai_suggestions.len();
        Self {
            query,
            category,
            existing_resources,
            ai_suggestions,
            total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn suggestion(title: &str) -> SuggestedResource {
        SuggestedResource {
            title: title.to_string(),
            url: None,
            description: None,
            resource_type: None,
            tags: vec![],
        }
    }

    #[test]
    fn test_combine_truncates_suggestions_to_remaining_slots() {
        let resp = ResourceSearchResponse::combine(
            "sdg".into(),
            "general".into(),
            vec![],
            vec![suggestion("a"), suggestion("b"), suggestion("c")],
            2,
        );
        assert_eq!(resp.ai_suggestions.len(), 2);
        assert_eq!(resp.total, 2);
    }
}
