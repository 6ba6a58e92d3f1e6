use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;
use uuid::Uuid;

use super::GroupService;
use crate::authz::{Action, GroupFacts, Resource, Role, can};
use crate::models::{ApiResponse, ErrorCode, groups::requests::AddMemberRequest};
use crate::services::{internal_error, require_actor};

fn forbidden() -> HttpResponse {
    HttpResponse::Forbidden().json(ApiResponse::error_empty(
        ErrorCode::GroupPermissionDenied,
        "Only admins can manage group members",
    ))
}

fn group_not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::error_empty(
        ErrorCode::GroupNotFound,
        "Group not found",
    ))
}

pub async fn add_member(
    service: &GroupService,
    request: &HttpRequest,
    group_id: Uuid,
    member_data: AddMemberRequest,
) -> ActixResult<HttpResponse> {
    let actor = match require_actor(request) {
        Ok(actor) => actor,
        Err(resp) => return Ok(resp),
    };

    if !can(&actor, Action::Update, &Resource::Group(GroupFacts::default())) {
        return Ok(forbidden());
    }

    let storage = service.get_storage(request);

    match storage.get_group_by_id(group_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return Ok(group_not_found()),
        Err(e) => return Ok(internal_error("Failed to get group information", e)),
    }

    match storage.get_user_by_id(member_data.student_id).await {
        Ok(Some(user)) if Role::from(user.role) == Role::Student => {}
        Ok(_) => {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::GroupMemberInvalid,
                "Invalid student ID or user is not a student",
            )));
        }
        Err(e) => return Ok(internal_error("Failed to verify student", e)),
    }

    match storage
        .add_group_member(group_id, member_data.student_id)
        .await
    {
        Ok(member) => {
            info!(
                "Student {} added to group {} by {}",
                member.student_id, group_id, actor.id
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(
                member,
                "Member added successfully",
            )))
        }
        Err(e) => Ok(internal_error("Failed to add group member", e)),
    }
}

pub async fn remove_member(
    service: &GroupService,
    request: &HttpRequest,
    group_id: Uuid,
    student_id: Uuid,
) -> ActixResult<HttpResponse> {
    let actor = match require_actor(request) {
        Ok(actor) => actor,
        Err(resp) => return Ok(resp),
    };

    if !can(&actor, Action::Update, &Resource::Group(GroupFacts::default())) {
        return Ok(forbidden());
    }

    let storage = service.get_storage(request);

    match storage.remove_group_member(group_id, student_id).await {
        Ok(true) => {
            info!(
                "Student {} removed from group {} by {}",
                student_id, group_id, actor.id
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Member removed successfully")))
        }
        Ok(false) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::NotFound,
            "Group member not found",
        ))),
        Err(e) => Ok(internal_error("Failed to remove group member", e)),
    }
}
