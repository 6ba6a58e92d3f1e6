//! 存储桶访问控制
//!
//! 上传路径约定为 `[folder/]<user_id>/<basename>_<timestamp>.<ext>`，
//! 所有权通过路径中是否包含用户 ID 判断（子串匹配，不是按路径段精确匹配）。

use super::{Actor, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    Resources,
    Works,
    Avatars,
    Materials,
}

impl Bucket {
    pub const ALL: [Bucket; 4] = [
        Bucket::Resources,
        Bucket::Works,
        Bucket::Avatars,
        Bucket::Materials,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Bucket::Resources => "resources",
            Bucket::Works => "works",
            Bucket::Avatars => "avatars",
            Bucket::Materials => "materials",
        }
    }
}

impl std::fmt::Display for Bucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Bucket {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "resources" => Ok(Bucket::Resources),
            "works" => Ok(Bucket::Works),
            "avatars" => Ok(Bucket::Avatars),
            "materials" => Ok(Bucket::Materials),
            _ => Err(format!("Unknown bucket: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectOp {
    Upload,
    Download,
    List,
    Delete,
}

// NOTE: 子串匹配会把“恰好包含该 ID”的路径也视为本人所有
fn path_owned_by(path: &str, actor: &Actor) -> bool {
    path.contains(&actor.id.to_string())
}

/// 判断对某个桶内对象的操作是否允许；未知桶一律拒绝
pub fn can_access_object(actor: &Actor, op: ObjectOp, bucket: &str, path: &str) -> bool {
    match bucket.parse::<Bucket>() {
        Ok(bucket) => bucket_allows(actor, op, bucket, path),
        Err(_) => false,
    }
}

fn bucket_allows(actor: &Actor, op: ObjectOp, bucket: Bucket, path: &str) -> bool {
    use ObjectOp::*;
    use Role::*;

    match (bucket, op) {
        (_, List) => true,

        (Bucket::Resources, Upload) => matches!(actor.role, Admin | Mentor),
        (Bucket::Resources, Download) => true,
        (Bucket::Resources, Delete) => match actor.role {
            Admin => true,
            Mentor => path_owned_by(path, actor),
            Student | School => false,
        },

        (Bucket::Works, Upload) => matches!(actor.role, Admin | Mentor | Student),
        (Bucket::Works, Download) => match actor.role {
            Admin | Mentor => true,
            Student | School => path_owned_by(path, actor),
        },
        (Bucket::Works, Delete) => actor.is_admin() || path_owned_by(path, actor),

        (Bucket::Avatars, Upload | Download) => true,
        (Bucket::Avatars, Delete) => actor.is_admin() || path_owned_by(path, actor),

        (Bucket::Materials, Upload | Delete) => actor.is_admin(),
        (Bucket::Materials, Download) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn actor(role: Role) -> Actor {
        Actor::new(Uuid::new_v4(), role)
    }

    #[test]
    fn test_unknown_bucket_denied() {
        let admin = actor(Role::Admin);
        for op in [ObjectOp::Upload, ObjectOp::Download, ObjectOp::List, ObjectOp::Delete] {
            assert!(!can_access_object(&admin, op, "secrets", "a/b.txt"));
        }
    }

    #[test]
    fn test_list_open_to_all_known_buckets() {
        for bucket in Bucket::ALL {
            for role in [Role::Admin, Role::Mentor, Role::Student, Role::School] {
                assert!(can_access_object(&actor(role), ObjectOp::List, bucket.as_str(), ""));
            }
        }
    }

    #[test]
    fn test_upload_rules() {
        let up = |role, bucket| can_access_object(&actor(role), ObjectOp::Upload, bucket, "x");
        assert!(up(Role::Admin, "resources"));
        assert!(up(Role::Mentor, "resources"));
        assert!(!up(Role::Student, "resources"));
        assert!(up(Role::Student, "works"));
        assert!(!up(Role::School, "works"));
        assert!(up(Role::School, "avatars"));
        assert!(up(Role::Admin, "materials"));
        assert!(!up(Role::Mentor, "materials"));
    }

    #[test]
    fn test_works_download_requires_ownership_for_students() {
        let student = actor(Role::Student);
        let own = format!("{}/report_1700000000.pdf", student.id);
        let other = format!("{}/report_1700000000.pdf", Uuid::new_v4());
        assert!(can_access_object(&student, ObjectOp::Download, "works", &own));
        assert!(!can_access_object(&student, ObjectOp::Download, "works", &other));
        assert!(can_access_object(&actor(Role::Mentor), ObjectOp::Download, "works", &other));
    }

    #[test]
    fn test_substring_path_counts_as_owned() {
        // 用户 ID 只是文件名的一部分，也会被视为本人所有
        let student = actor(Role::Student);
        let path = format!("shared/{}-copy_1700000000.pdf", student.id);
        assert!(can_access_object(&student, ObjectOp::Delete, "works", &path));
        assert!(can_access_object(&student, ObjectOp::Download, "works", &path));
    }

    #[test]
    fn test_delete_rules() {
        let mentor = actor(Role::Mentor);
        let own = format!("{}/slides_1.pdf", mentor.id);
        assert!(can_access_object(&mentor, ObjectOp::Delete, "resources", &own));
        assert!(!can_access_object(&mentor, ObjectOp::Delete, "resources", "other/slides_1.pdf"));
        assert!(!can_access_object(&actor(Role::Student), ObjectOp::Delete, "resources", &own));
        assert!(can_access_object(&actor(Role::Admin), ObjectOp::Delete, "materials", "a/b"));
        assert!(!can_access_object(&mentor, ObjectOp::Delete, "materials", &own));
        assert!(can_access_object(&mentor, ObjectOp::Delete, "avatars", &own));
    }
}
