//! 访问决策矩阵的整体校验

use dailyreport_server::authz::{
    Action, Actor, GroupFacts, ObjectOp, Resource, Role, WorkFacts, can, can_access_object,
};
use dailyreport_server::models::works::entities::WorkStatus;
use uuid::Uuid;

const ROLES: [Role; 4] = [Role::Admin, Role::Mentor, Role::Student, Role::School];

fn actor(role: Role) -> Actor {
    Actor::new(Uuid::new_v4(), role)
}

/// 每个角色对“与自己无关”的资源的决定
fn decisions(action: Action, resource: Resource) -> Vec<bool> {
    ROLES
        .iter()
        .map(|&role| can(&actor(role), action, &resource))
        .collect()
}

#[test]
fn group_access_for_unrelated_actor() {
    let group = Resource::Group(GroupFacts {
        mentor_id: Some(Uuid::new_v4()),
        actor_is_member: false,
    });
    assert_eq!(decisions(Action::Read, group), [true, false, false, true]);
    for action in [Action::Create, Action::Update, Action::Delete] {
        assert_eq!(decisions(action, group), [true, false, false, false]);
    }
}

#[test]
fn group_access_for_related_actor() {
    let mentor = actor(Role::Mentor);
    let mentored = Resource::Group(GroupFacts {
        mentor_id: Some(mentor.id),
        actor_is_member: false,
    });
    assert!(can(&mentor, Action::Read, &mentored));
    assert!(!can(&mentor, Action::Update, &mentored));

    let student = actor(Role::Student);
    let joined = Resource::Group(GroupFacts {
        mentor_id: None,
        actor_is_member: true,
    });
    assert!(can(&student, Action::Read, &joined));
    assert!(!can(&student, Action::Delete, &joined));
}

#[test]
fn work_access_for_owner_and_group_mentor() {
    let student = actor(Role::Student);
    let mentor = actor(Role::Mentor);
    let work = |status| {
        Resource::Work(WorkFacts {
            owner_id: student.id,
            group_mentor_id: Some(mentor.id),
            status,
        })
    };

    let submitted = work(WorkStatus::Submitted);
    assert!(can(&student, Action::Read, &submitted));
    assert!(can(&student, Action::Update, &submitted));
    assert!(can(&student, Action::Delete, &submitted));
    assert!(!can(&student, Action::Review, &submitted));

    assert!(can(&mentor, Action::Read, &submitted));
    assert!(can(&mentor, Action::Update, &submitted));
    assert!(can(&mentor, Action::Review, &submitted));
    assert!(!can(&mentor, Action::Delete, &submitted));

    // 已批阅的作品学生不能再改，但仍可删除
    let reviewed = work(WorkStatus::Reviewed);
    assert!(!can(&student, Action::Update, &reviewed));
    assert!(can(&student, Action::Delete, &reviewed));
}

#[test]
fn work_access_for_unrelated_actor() {
    let work = Resource::Work(WorkFacts {
        owner_id: Uuid::new_v4(),
        group_mentor_id: Some(Uuid::new_v4()),
        status: WorkStatus::Submitted,
    });
    assert_eq!(decisions(Action::Read, work), [true, false, false, false]);
    assert_eq!(decisions(Action::Update, work), [true, false, false, false]);
    assert_eq!(decisions(Action::Delete, work), [true, false, false, false]);
    assert_eq!(decisions(Action::Review, work), [true, false, false, false]);
}

#[test]
fn only_students_create_their_own_works() {
    for role in ROLES {
        let a = actor(role);
        let own = Resource::Work(WorkFacts {
            owner_id: a.id,
            group_mentor_id: None,
            status: WorkStatus::Submitted,
        });
        assert_eq!(can(&a, Action::Create, &own), role == Role::Student);
    }
}

#[test]
fn learning_resource_access() {
    let foreign = Resource::LearningResource {
        uploaded_by: Some(Uuid::new_v4()),
    };
    assert_eq!(decisions(Action::Read, foreign), [true, true, true, true]);
    assert_eq!(decisions(Action::Favorite, foreign), [true, true, true, true]);
    assert_eq!(decisions(Action::Create, foreign), [true, true, false, false]);
    assert_eq!(decisions(Action::Update, foreign), [true, false, false, false]);
    assert_eq!(decisions(Action::Delete, foreign), [true, false, false, false]);

    for role in ROLES {
        let a = actor(role);
        let own = Resource::LearningResource {
            uploaded_by: Some(a.id),
        };
        assert!(can(&a, Action::Update, &own));
        assert!(can(&a, Action::Delete, &own));
    }
}

#[test]
fn message_access() {
    let outside = Resource::Message {
        group: GroupFacts {
            mentor_id: Some(Uuid::new_v4()),
            actor_is_member: false,
        },
        sender_id: Some(Uuid::new_v4()),
    };
    assert_eq!(decisions(Action::Read, outside), [true, false, false, true]);
    assert_eq!(decisions(Action::Create, outside), [true, false, false, true]);
    assert_eq!(decisions(Action::Delete, outside), [true, false, false, false]);

    // 发送者可以删除自己的消息，不论角色
    for role in ROLES {
        let a = actor(role);
        let own = Resource::Message {
            group: GroupFacts::default(),
            sender_id: Some(a.id),
        };
        assert!(can(&a, Action::Delete, &own));
        assert!(!can(&a, Action::Update, &own));
    }
}

#[test]
fn user_directory_and_profiles() {
    assert_eq!(
        decisions(Action::Read, Resource::UserDirectory),
        [true, false, false, false]
    );

    for role in ROLES {
        let a = actor(role);
        let own = Resource::Profile { user_id: a.id };
        let other = Resource::Profile {
            user_id: Uuid::new_v4(),
        };
        assert!(can(&a, Action::Read, &own));
        assert!(can(&a, Action::Update, &own));
        assert!(!can(&a, Action::Delete, &own));
        assert!(!can(&a, Action::Read, &other));
    }
}

#[test]
fn bucket_rules_and_substring_ownership() {
    let student = actor(Role::Student);
    let own_path = format!("{}/report_2025.pdf", student.id);
    // 路径只要包含 ID 就视为本人所有
    let embedded = format!("archive/x{}y/report.pdf", student.id);
    let foreign = format!("{}/report.pdf", Uuid::new_v4());

    assert!(can_access_object(&student, ObjectOp::Upload, "works", &own_path));
    assert!(can_access_object(&student, ObjectOp::Download, "works", &own_path));
    assert!(can_access_object(&student, ObjectOp::Delete, "works", &embedded));
    assert!(!can_access_object(&student, ObjectOp::Download, "works", &foreign));
    assert!(!can_access_object(&student, ObjectOp::Delete, "works", &foreign));

    assert!(!can_access_object(&student, ObjectOp::Upload, "resources", &own_path));
    assert!(!can_access_object(&student, ObjectOp::Upload, "materials", &own_path));
    assert!(can_access_object(&student, ObjectOp::Upload, "avatars", &own_path));

    let school = actor(Role::School);
    assert!(!can_access_object(&school, ObjectOp::Upload, "works", &own_path));
    assert!(can_access_object(&school, ObjectOp::List, "works", ""));

    let admin = actor(Role::Admin);
    for op in [ObjectOp::Upload, ObjectOp::Download, ObjectOp::List, ObjectOp::Delete] {
        assert!(!can_access_object(&admin, op, "secrets", &own_path));
    }
}
