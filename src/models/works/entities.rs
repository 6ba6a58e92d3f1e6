use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

// 作品状态，只能向前推进
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, PartialOrd, Ord, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/work.ts")]
pub enum WorkStatus {
    Draft,     // 草稿
    Submitted, // 已提交
    Reviewed,  // 已批阅
}

impl WorkStatus {
    pub const DRAFT: &'static str = "draft";
    pub const SUBMITTED: &'static str = "submitted";
    pub const REVIEWED: &'static str = "reviewed";

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkStatus::Draft => Self::DRAFT,
            WorkStatus::Submitted => Self::SUBMITTED,
            WorkStatus::Reviewed => Self::REVIEWED,
        }
    }

    /// 状态流转检查：允许保持不变或向前推进
    pub fn can_transition_to(&self, next: WorkStatus) -> bool {
        next >= *self
    }
}

impl<'de> Deserialize<'de> for WorkStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(|_| {
            serde::de::Error::custom(format!(
                "无效的作品状态: '{s}'. 支持的状态: draft, submitted, reviewed"
            ))
        })
    }
}

impl std::fmt::Display for WorkStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for WorkStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            Self::DRAFT => Ok(WorkStatus::Draft),
            Self::SUBMITTED => Ok(WorkStatus::Submitted),
            Self::REVIEWED => Ok(WorkStatus::Reviewed),
            _ => Err(format!("Invalid work status: {s}")),
        }
    }
}

// 作品实体
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/work.ts")]
pub struct Work {
    pub id: Uuid,
    pub user_id: Uuid,
    pub group_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub content: Option<String>,
    #[serde(rename = "type")]
    pub work_type: String,
    pub file_url: Option<String>,
    pub status: WorkStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

// 导师反馈
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/work.ts")]
pub struct Feedback {
    pub id: Uuid,
    pub work_id: Uuid,
    pub reviewer_id: Uuid,
    pub comment: String,
    pub rating: Option<i32>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_moves_forward_only() {
        assert!(WorkStatus::Draft.can_transition_to(WorkStatus::Submitted));
        assert!(WorkStatus::Submitted.can_transition_to(WorkStatus::Reviewed));
        assert!(WorkStatus::Draft.can_transition_to(WorkStatus::Reviewed));
        assert!(WorkStatus::Reviewed.can_transition_to(WorkStatus::Reviewed));

        assert!(!WorkStatus::Reviewed.can_transition_to(WorkStatus::Submitted));
        assert!(!WorkStatus::Submitted.can_transition_to(WorkStatus::Draft));
        assert!(!WorkStatus::Reviewed.can_transition_to(WorkStatus::Draft));
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("reviewed".parse::<WorkStatus>(), Ok(WorkStatus::Reviewed));
        assert!("graded".parse::<WorkStatus>().is_err());
    }
}
