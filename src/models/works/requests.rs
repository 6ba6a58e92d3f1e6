use serde::{Deserialize, Deserializer};
use ts_rs::TS;
use uuid::Uuid;

use super::entities::WorkStatus;

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/work.ts")]
pub struct CreateWorkRequest {
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
    pub content: Option<String>,
    #[serde(rename = "type", default)]
    pub work_type: String,
    pub file_url: Option<String>,
    pub group_id: Option<Uuid>,
    /// 学生创建时忽略该字段
    pub status: Option<WorkStatus>,
}

// 只要请求中出现该键就记为 Some，值为 null 时是 Some(None)
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// 作品更新请求
//
// 每个字段区分"未出现"和"显式为 null"，未识别的键保留在 `extra` 中，
// 两者都用于字段级权限检查。
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/work.ts")]
pub struct UpdateWorkRequest {
    #[serde(default, deserialize_with = "present")]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub content: Option<Option<String>>,
    #[serde(rename = "type", default, deserialize_with = "present")]
    pub work_type: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub file_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub group_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "present")]
    pub status: Option<Option<WorkStatus>>,
    #[serde(flatten)]
    #[ts(skip)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl UpdateWorkRequest {
    /// 请求中除 status 以外是否还有其他键（包括值为 null 的键）
    pub fn has_non_status_keys(&self) -> bool {
        self.title.is_some()
            || self.description.is_some()
            || self.content.is_some()
            || self.work_type.is_some()
            || self.file_url.is_some()
            || self.group_id.is_some()
            || !self.extra.is_empty()
    }

    /// 请求要切换到的状态，`"status": null` 视为不修改
    pub fn next_status(&self) -> Option<WorkStatus> {
        self.status.flatten()
    }
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/work.ts")]
pub struct CreateFeedbackRequest {
    pub comment: Option<String>,
    /// 1 到 5 分，可不填
    pub rating: Option<i32>,
}

impl CreateFeedbackRequest {
    pub const RATING_RANGE: std::ops::RangeInclusive<i32> = 1..=5;

    pub fn rating_is_valid(&self) -> bool {
        self.rating
            .is_none_or(|rating| Self::RATING_RANGE.contains(&rating))
    }
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/work.ts")]
pub struct WorkListQuery {
    pub user_id: Option<Uuid>,
    pub group_id: Option<Uuid>,
    #[serde(rename = "type")]
    pub work_type: Option<String>,
    pub status: Option<WorkStatus>,
}

/// 存储层使用的作品筛选条件（已按角色收敛范围）
#[derive(Debug, Clone, Default)]
pub struct WorkFilter {
    pub user_id: Option<Uuid>,
    /// `Some` 时只返回这些小组内的作品
    pub group_ids: Option<Vec<Uuid>>,
    pub work_type: Option<String>,
    pub status: Option<WorkStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_status_only() {
        let req: UpdateWorkRequest =
            serde_json::from_value(serde_json::json!({ "status": "reviewed" })).unwrap();
        assert_eq!(req.next_status(), Some(WorkStatus::Reviewed));
        assert!(!req.has_non_status_keys());
    }

    #[test]
    fn test_update_null_valued_keys_are_present() {
        let req: UpdateWorkRequest = serde_json::from_value(serde_json::json!({
            "status": "reviewed",
            "title": null,
            "group_id": null
        }))
        .unwrap();
        assert_eq!(req.title, Some(None));
        assert_eq!(req.group_id, Some(None));
        assert_eq!(req.description, None);
        assert!(req.has_non_status_keys());

        let status_null: UpdateWorkRequest =
            serde_json::from_value(serde_json::json!({ "status": null })).unwrap();
        assert!(status_null.status.is_some());
        assert_eq!(status_null.next_status(), None);
    }

    #[test]
    fn test_feedback_rating_range() {
        let rating = |rating| CreateFeedbackRequest {
            comment: Some("Nice".into()),
            rating,
        };
        assert!(rating(None).rating_is_valid());
        assert!(rating(Some(1)).rating_is_valid());
        assert!(rating(Some(5)).rating_is_valid());
        assert!(!rating(Some(0)).rating_is_valid());
        assert!(!rating(Some(6)).rating_is_valid());
        assert!(!rating(Some(-7)).rating_is_valid());
    }

    #[test]
    fn test_update_unknown_key_counts_as_extra() {
        let req: UpdateWorkRequest = serde_json::from_value(serde_json::json!({
            "status": "reviewed",
            "score": 10
        }))
        .unwrap();
        assert!(req.has_non_status_keys());
    }
}
