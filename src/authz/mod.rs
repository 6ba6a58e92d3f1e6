//! 统一访问控制
//!
//! 所有资源的权限判断都经过 [`can`]。调用方先从数据库取出判断所需的事实
//! （所有者、小组导师、成员关系等），再交给这里做纯函数判定。

pub mod buckets;
pub mod session;

use uuid::Uuid;

use crate::models::users::entities::{User, UserRole};
use crate::models::works::entities::WorkStatus;

pub use buckets::{Bucket, ObjectOp, can_access_object};
pub use session::{SESSIONS, SessionContext, SessionRegistry};

/// 权限判定使用的角色
///
/// `mentor` 与 `international_student` 两种存储角色合并为 `Mentor`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Admin,
    Mentor,
    Student,
    School,
}

impl From<UserRole> for Role {
    fn from(role: UserRole) -> Self {
        match role {
            UserRole::Admin => Role::Admin,
            UserRole::Mentor | UserRole::InternationalStudent => Role::Mentor,
            UserRole::Student => Role::Student,
            UserRole::School => Role::School,
        }
    }
}

/// 发起请求的用户
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: Uuid,
    pub role: Role,
}

impl Actor {
    pub fn new(id: Uuid, role: Role) -> Self {
        Self { id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            role: user.role.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
    /// 给作品写反馈
    Review,
    /// 收藏学习资源
    Favorite,
}

/// 小组相关事实
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroupFacts {
    pub mentor_id: Option<Uuid>,
    pub actor_is_member: bool,
}

impl GroupFacts {
    fn mentored_by(&self, actor: &Actor) -> bool {
        self.mentor_id == Some(actor.id)
    }
}

/// 作品相关事实
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkFacts {
    pub owner_id: Uuid,
    /// 作品所在小组的导师
    pub group_mentor_id: Option<Uuid>,
    pub status: WorkStatus,
}

/// 被访问的资源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Group(GroupFacts),
    Work(WorkFacts),
    LearningResource { uploaded_by: Option<Uuid> },
    Message {
        group: GroupFacts,
        sender_id: Option<Uuid>,
    },
    UserDirectory,
    Profile { user_id: Uuid },
}

/// 判断 actor 能否对 resource 执行 action
pub fn can(actor: &Actor, action: Action, resource: &Resource) -> bool {
    use Action::*;
    use Role::*;

    match resource {
        Resource::Group(group) => match (action, actor.role) {
            (Read, Admin | School) => true,
            (Read, Mentor) => group.mentored_by(actor),
            (Read, Student) => group.actor_is_member,
            (Create | Update | Delete, Admin) => true,
            (Create | Update | Delete, Mentor | Student | School) => false,
            (Review | Favorite, _) => false,
        },

        Resource::Work(work) => {
            let is_owner = work.owner_id == actor.id;
            let is_group_mentor = work.group_mentor_id == Some(actor.id);
            match (action, actor.role) {
                (Read, Admin) => true,
                (Read, Mentor) => is_group_mentor,
                (Read, Student) => is_owner,
                (Read, School) => false,
                (Create, Student) => is_owner,
                (Create, Admin | Mentor | School) => false,
                (Update, Admin) => true,
                (Update, Mentor) => is_group_mentor,
                (Update, Student) => is_owner && work.status != WorkStatus::Reviewed,
                (Update, School) => false,
                (Delete, Admin) => true,
                (Delete, Student) => is_owner,
                (Delete, Mentor | School) => false,
                (Review, Admin) => true,
                (Review, Mentor) => is_group_mentor,
                (Review, Student | School) => false,
                (Favorite, _) => false,
            }
        }

        Resource::LearningResource { uploaded_by } => {
            let is_uploader = *uploaded_by == Some(actor.id);
            match (action, actor.role) {
                (Read | Favorite, _) => true,
                (Create, Admin | Mentor) => true,
                (Create, Student | School) => false,
                (Update | Delete, Admin) => true,
                (Update | Delete, Mentor | Student | School) => is_uploader,
                (Review, _) => false,
            }
        }

        Resource::Message { group, sender_id } => {
            let in_scope = match actor.role {
                Admin | School => true,
                Mentor => group.mentored_by(actor),
                Student => group.actor_is_member,
            };
            match action {
                Read | Create => in_scope,
                Delete => actor.is_admin() || *sender_id == Some(actor.id),
                Update | Review | Favorite => false,
            }
        }

        Resource::UserDirectory => matches!((action, actor.role), (Read, Admin)),

        Resource::Profile { user_id } => {
            matches!(action, Read | Update) && *user_id == actor.id
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(role: Role) -> Actor {
        Actor::new(Uuid::new_v4(), role)
    }

    #[test]
    fn test_role_mapping() {
        assert_eq!(Role::from(UserRole::Mentor), Role::Mentor);
        assert_eq!(Role::from(UserRole::InternationalStudent), Role::Mentor);
        assert_eq!(Role::from(UserRole::Student), Role::Student);
        assert_eq!(Role::from(UserRole::School), Role::School);
        assert_eq!(Role::from(UserRole::Admin), Role::Admin);
    }

    #[test]
    fn test_group_read_scopes() {
        let mentor = actor(Role::Mentor);
        let student = actor(Role::Student);
        let mentored = Resource::Group(GroupFacts {
            mentor_id: Some(mentor.id),
            actor_is_member: false,
        });
        let other = Resource::Group(GroupFacts::default());
        let joined = Resource::Group(GroupFacts {
            mentor_id: None,
            actor_is_member: true,
        });

        assert!(can(&actor(Role::Admin), Action::Read, &other));
        assert!(can(&actor(Role::School), Action::Read, &other));
        assert!(can(&mentor, Action::Read, &mentored));
        assert!(!can(&mentor, Action::Read, &other));
        assert!(can(&student, Action::Read, &joined));
        assert!(!can(&student, Action::Read, &other));
    }

    #[test]
    fn test_group_writes_admin_only() {
        let mentor = actor(Role::Mentor);
        let own = Resource::Group(GroupFacts {
            mentor_id: Some(mentor.id),
            actor_is_member: true,
        });
        for action in [Action::Create, Action::Update, Action::Delete] {
            assert!(can(&actor(Role::Admin), action, &own));
            assert!(!can(&mentor, action, &own));
            assert!(!can(&actor(Role::Student), action, &own));
            assert!(!can(&actor(Role::School), action, &own));
        }
    }

    #[test]
    fn test_work_matrix() {
        let student = actor(Role::Student);
        let mentor = actor(Role::Mentor);
        let admin = actor(Role::Admin);
        let school = actor(Role::School);
        let work = Resource::Work(WorkFacts {
            owner_id: student.id,
            group_mentor_id: Some(mentor.id),
            status: WorkStatus::Submitted,
        });

        // 读取
        assert!(can(&admin, Action::Read, &work));
        assert!(can(&mentor, Action::Read, &work));
        assert!(can(&student, Action::Read, &work));
        assert!(!can(&school, Action::Read, &work));
        assert!(!can(&actor(Role::Mentor), Action::Read, &work));
        assert!(!can(&actor(Role::Student), Action::Read, &work));

        // 创建
        assert!(can(&student, Action::Create, &work));
        assert!(!can(&actor(Role::Student), Action::Create, &work));
        assert!(!can(&admin, Action::Create, &work));
        assert!(!can(&mentor, Action::Create, &work));

        // 更新
        assert!(can(&admin, Action::Update, &work));
        assert!(can(&mentor, Action::Update, &work));
        assert!(can(&student, Action::Update, &work));
        assert!(!can(&school, Action::Update, &work));

        // 删除
        assert!(can(&admin, Action::Delete, &work));
        assert!(can(&student, Action::Delete, &work));
        assert!(!can(&mentor, Action::Delete, &work));

        // 反馈
        assert!(can(&admin, Action::Review, &work));
        assert!(can(&mentor, Action::Review, &work));
        assert!(!can(&actor(Role::Mentor), Action::Review, &work));
        assert!(!can(&student, Action::Review, &work));
    }

    #[test]
    fn test_student_cannot_update_reviewed_work() {
        let student = actor(Role::Student);
        let reviewed = Resource::Work(WorkFacts {
            owner_id: student.id,
            group_mentor_id: None,
            status: WorkStatus::Reviewed,
        });
        assert!(!can(&student, Action::Update, &reviewed));
        assert!(can(&student, Action::Delete, &reviewed));
    }

    #[test]
    fn test_learning_resource_matrix() {
        let mentor = actor(Role::Mentor);
        let own = Resource::LearningResource {
            uploaded_by: Some(mentor.id),
        };
        let foreign = Resource::LearningResource { uploaded_by: None };

        for role in [Role::Admin, Role::Mentor, Role::Student, Role::School] {
            assert!(can(&actor(role), Action::Read, &foreign));
            assert!(can(&actor(role), Action::Favorite, &foreign));
        }
        assert!(can(&actor(Role::Admin), Action::Create, &foreign));
        assert!(can(&mentor, Action::Create, &foreign));
        assert!(!can(&actor(Role::Student), Action::Create, &foreign));
        assert!(!can(&actor(Role::School), Action::Create, &foreign));

        assert!(can(&mentor, Action::Update, &own));
        assert!(can(&mentor, Action::Delete, &own));
        assert!(!can(&mentor, Action::Update, &foreign));
        assert!(can(&actor(Role::Admin), Action::Delete, &foreign));
    }

    #[test]
    fn test_message_matrix() {
        let student = actor(Role::Student);
        let mentor = actor(Role::Mentor);
        let member_group = GroupFacts {
            mentor_id: Some(mentor.id),
            actor_is_member: true,
        };
        let outside_group = GroupFacts::default();

        let in_group = Resource::Message {
            group: member_group,
            sender_id: None,
        };
        let outside = Resource::Message {
            group: outside_group,
            sender_id: None,
        };

        assert!(can(&student, Action::Read, &in_group));
        assert!(can(&student, Action::Create, &in_group));
        assert!(!can(&student, Action::Read, &outside));
        assert!(can(&mentor, Action::Create, &in_group));
        assert!(!can(&mentor, Action::Create, &outside));
        assert!(can(&actor(Role::School), Action::Read, &outside));
        assert!(can(&actor(Role::Admin), Action::Create, &outside));
    }

    #[test]
    fn test_message_delete_sender_or_admin() {
        let sender = actor(Role::Student);
        let msg = Resource::Message {
            group: GroupFacts::default(),
            sender_id: Some(sender.id),
        };
        assert!(can(&sender, Action::Delete, &msg));
        assert!(can(&actor(Role::Admin), Action::Delete, &msg));
        assert!(!can(&actor(Role::Mentor), Action::Delete, &msg));
        assert!(!can(&actor(Role::School), Action::Delete, &msg));
        assert!(!can(&actor(Role::Student), Action::Delete, &msg));
    }

    #[test]
    fn test_directory_and_profile() {
        assert!(can(&actor(Role::Admin), Action::Read, &Resource::UserDirectory));
        for role in [Role::Mentor, Role::Student, Role::School] {
            assert!(!can(&actor(role), Action::Read, &Resource::UserDirectory));
        }

        let me = actor(Role::School);
        let mine = Resource::Profile { user_id: me.id };
        let theirs = Resource::Profile {
            user_id: Uuid::new_v4(),
        };
        assert!(can(&me, Action::Read, &mine));
        assert!(can(&me, Action::Update, &mine));
        assert!(!can(&me, Action::Update, &theirs));
        assert!(!can(&me, Action::Delete, &mine));
    }
}
