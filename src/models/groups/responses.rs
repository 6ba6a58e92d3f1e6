use serde::Serialize;
use ts_rs::TS;

use super::entities::Group;
use crate::models::users::entities::User;

// 小组详情，包含导师与成员
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/group.ts")]
pub struct GroupDetail {
    #[serde(flatten)]
    pub group: Group,
    pub mentor: Option<User>,
    pub members: Vec<User>,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/group.ts")]
pub struct GroupListResponse {
    pub items: Vec<Group>,
}
