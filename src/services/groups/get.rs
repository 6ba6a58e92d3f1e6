use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use uuid::Uuid;

use super::{GroupService, group_facts};
use crate::authz::{Action, Resource, can};
use crate::models::{ApiResponse, ErrorCode, groups::responses::GroupDetail};
use crate::services::{internal_error, require_actor};

pub async fn get_group(
    service: &GroupService,
    request: &HttpRequest,
    group_id: Uuid,
) -> ActixResult<HttpResponse> {
    let actor = match require_actor(request) {
        Ok(actor) => actor,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    let group = match storage.get_group_by_id(group_id).await {
        Ok(Some(group)) => group,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::GroupNotFound,
                "Group not found",
            )));
        }
        Err(e) => return Ok(internal_error("Failed to get group information", e)),
    };

    let facts = match group_facts(&storage, &group, &actor).await {
        Ok(facts) => facts,
        Err(e) => return Ok(internal_error("Failed to check group membership", e)),
    };

    if !can(&actor, Action::Read, &Resource::Group(facts)) {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::GroupPermissionDenied,
            "You do not have access to this group",
        )));
    }

    let mentor = match group.mentor_id {
        Some(mentor_id) => match storage.get_user_by_id(mentor_id).await {
            Ok(mentor) => mentor,
            Err(e) => return Ok(internal_error("Failed to get group mentor", e)),
        },
        None => None,
    };

    let members = match storage.list_group_members(group.id).await {
        Ok(members) => members,
        Err(e) => return Ok(internal_error("Failed to get group members", e)),
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        GroupDetail {
            group,
            mentor,
            members,
        },
        "Group information retrieved successfully",
    )))
}
