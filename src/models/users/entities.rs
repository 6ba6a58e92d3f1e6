use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

// 用户角色（数据库中保存的原始值）
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/user.ts")]
pub enum UserRole {
    Admin,                // 管理员
    Mentor,               // 导师
    InternationalStudent, // 留学生导师
    Student,              // 学生
    School,               // 合作学校
}

impl UserRole {
    pub const ADMIN: &'static str = "admin";
    pub const MENTOR: &'static str = "mentor";
    pub const INTERNATIONAL_STUDENT: &'static str = "international_student";
    pub const STUDENT: &'static str = "student";
    pub const SCHOOL: &'static str = "school";

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => Self::ADMIN,
            UserRole::Mentor => Self::MENTOR,
            UserRole::InternationalStudent => Self::INTERNATIONAL_STUDENT,
            UserRole::Student => Self::STUDENT,
            UserRole::School => Self::SCHOOL,
        }
    }

    /// 注册时允许用户自选的角色
    pub fn is_self_selectable(&self) -> bool {
        matches!(
            self,
            UserRole::Student | UserRole::InternationalStudent | UserRole::School
        )
    }
}

impl<'de> Deserialize<'de> for UserRole {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(|_| {
            serde::de::Error::custom(format!(
                "无效的用户角色: '{s}'. 支持的角色: admin, mentor, international_student, student, school"
            ))
        })
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            Self::ADMIN => Ok(UserRole::Admin),
            Self::MENTOR => Ok(UserRole::Mentor),
            Self::INTERNATIONAL_STUDENT => Ok(UserRole::InternationalStudent),
            Self::STUDENT => Ok(UserRole::Student),
            Self::SCHOOL => Ok(UserRole::School),
            _ => Err(format!("Invalid user role: {s}")),
        }
    }
}

// 用户实体
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/user.ts")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub role: UserRole,
    pub bio: Option<String>,
    pub country: Option<String>,
    pub school: Option<String>,
    pub group_id: Option<Uuid>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip_strings() {
        for role in [
            UserRole::Admin,
            UserRole::Mentor,
            UserRole::InternationalStudent,
            UserRole::Student,
            UserRole::School,
        ] {
            assert_eq!(role.as_str().parse::<UserRole>().unwrap(), role);
        }
        assert!("teacher".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_self_selectable_roles() {
        assert!(UserRole::Student.is_self_selectable());
        assert!(UserRole::InternationalStudent.is_self_selectable());
        assert!(UserRole::School.is_self_selectable());
        assert!(!UserRole::Admin.is_self_selectable());
        assert!(!UserRole::Mentor.is_self_selectable());
    }
}
