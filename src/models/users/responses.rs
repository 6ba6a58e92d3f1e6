use serde::Serialize;
use ts_rs::TS;

use super::entities::User;

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/user.ts")]
pub struct UserListResponse {
    pub items: Vec<User>,
    pub total: i64,
}
