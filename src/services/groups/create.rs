use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use super::GroupService;
use crate::authz::{Action, GroupFacts, Resource, Role, can};
use crate::models::{
    ApiResponse, ErrorCode,
    groups::requests::CreateGroupRequest,
    users::entities::{User, UserRole},
};
use crate::services::{internal_error, require_actor};
use crate::storage::Storage;

pub async fn create_group(
    service: &GroupService,
    request: &HttpRequest,
    mut group_data: CreateGroupRequest,
) -> ActixResult<HttpResponse> {
    let actor = match require_actor(request) {
        Ok(actor) => actor,
        Err(resp) => return Ok(resp),
    };

    if !can(&actor, Action::Create, &Resource::Group(GroupFacts::default())) {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::GroupPermissionDenied,
            "Only admins can create groups",
        )));
    }

    group_data.name = group_data.name.trim().to_string();
    if group_data.name.is_empty() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            "Group name is required",
        )));
    }

    let storage = service.get_storage(request);

    if let Some(mentor_id) = group_data.mentor_id
        && let Err(resp) = validate_mentor(&storage, mentor_id).await
    {
        return Ok(resp);
    }

    // 只保留学生角色的成员
    if !group_data.student_ids.is_empty() {
        match storage.get_users_by_ids(&group_data.student_ids).await {
            Ok(users) => group_data.student_ids = student_ids_of(&users),
            Err(e) => return Ok(internal_error("Failed to verify group members", e)),
        }
    }

    match storage.create_group(group_data).await {
        Ok(group) => {
            info!("Group {} created by {}", group.id, actor.id);
            Ok(HttpResponse::Created().json(ApiResponse::success(
                group,
                "Group created successfully",
            )))
        }
        Err(e) => Ok(internal_error("Failed to create group", e)),
    }
}

/// 导师 ID 必须指向导师角色的用户
pub(crate) async fn validate_mentor(
    storage: &Arc<dyn Storage>,
    mentor_id: Uuid,
) -> Result<(), HttpResponse> {
    match storage.get_user_by_id(mentor_id).await {
        Ok(Some(user)) if Role::from(user.role) == Role::Mentor => Ok(()),
        Ok(_) => Err(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::GroupMentorInvalid,
            "Invalid mentor ID or user is not a mentor",
        ))),
        Err(e) => Err(internal_error("Failed to verify mentor", e)),
    }
}

/// 过滤出学生角色用户的 ID
pub(crate) fn student_ids_of(users: &[User]) -> Vec<Uuid> {
    users
        .iter()
        .filter(|u| u.role == UserRole::Student)
        .map(|u| u.id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: UserRole) -> User {
        let now = chrono::Utc::now();
        User {
            id: Uuid::new_v4(),
            email: "u@example.com".into(),
            name: None,
            avatar_url: None,
            role,
            bio: None,
            country: None,
            school: None,
            group_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_only_students_become_members() {
        let student = user(UserRole::Student);
        let users = vec![
            student.clone(),
            user(UserRole::Mentor),
            user(UserRole::InternationalStudent),
            user(UserRole::School),
        ];
        assert_eq!(student_ids_of(&users), vec![student.id]);
    }
}
