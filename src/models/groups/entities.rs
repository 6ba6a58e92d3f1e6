use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

// 小组实体
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/group.ts")]
pub struct Group {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub mentor_id: Option<Uuid>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

// 小组成员
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/group.ts")]
pub struct GroupMember {
    pub id: Uuid,
    pub group_id: Uuid,
    pub student_id: Uuid,
    pub joined_at: chrono::DateTime<chrono::Utc>,
}
