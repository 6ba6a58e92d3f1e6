use serde::Serialize;
use ts_rs::TS;

use super::entities::{Feedback, Work};

// 作品及其反馈
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/work.ts")]
pub struct WorkWithFeedback {
    #[serde(flatten)]
    pub work: Work,
    pub feedback: Vec<Feedback>,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/work.ts")]
pub struct WorkListResponse {
    pub items: Vec<WorkWithFeedback>,
}
