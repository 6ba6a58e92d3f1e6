use serde::Deserialize;
use ts_rs::TS;
use uuid::Uuid;

use super::entities::UserRole;

// 更新个人资料请求；未列出的字段会被忽略
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/user.ts")]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    #[serde(alias = "avatar")]
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub country: Option<String>,
    pub school: Option<String>,
}

impl UpdateProfileRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.avatar_url.is_none()
            && self.bio.is_none()
            && self.country.is_none()
            && self.school.is_none()
    }
}

// 用户列表查询参数
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/user.ts")]
pub struct UserListQuery {
    pub role: Option<UserRole>,
}

// 首次登录时根据令牌信息创建的资料
#[derive(Debug, Clone)]
pub struct ProvisionProfileRequest {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub role: UserRole,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_update_ignores_unknown_keys() {
        let req: UpdateProfileRequest = serde_json::from_value(serde_json::json!({
            "name": "Aiko",
            "avatar": "https://cdn/a.png",
            "role": "admin",
            "email": "x@y.z"
        }))
        .unwrap();
        assert_eq!(req.name.as_deref(), Some("Aiko"));
        assert_eq!(req.avatar_url.as_deref(), Some("https://cdn/a.png"));
        assert!(!req.is_empty());
    }
}
