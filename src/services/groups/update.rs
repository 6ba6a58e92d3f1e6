use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;
use uuid::Uuid;

use super::{GroupService, create::validate_mentor};
use crate::authz::{Action, GroupFacts, Resource, can};
use crate::models::{ApiResponse, ErrorCode, groups::requests::UpdateGroupRequest};
use crate::services::{internal_error, require_actor};

pub async fn update_group(
    service: &GroupService,
    request: &HttpRequest,
    group_id: Uuid,
    mut update_data: UpdateGroupRequest,
) -> ActixResult<HttpResponse> {
    let actor = match require_actor(request) {
        Ok(actor) => actor,
        Err(resp) => return Ok(resp),
    };

    if !can(&actor, Action::Update, &Resource::Group(GroupFacts::default())) {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::GroupPermissionDenied,
            "Only admins can update groups",
        )));
    }

    if let Some(name) = update_data.name.as_mut() {
        *name = name.trim().to_string();
        if name.is_empty() {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::BadRequest,
                "Group name must not be empty",
            )));
        }
    }

    let storage = service.get_storage(request);

    if let Some(mentor_id) = update_data.mentor_id
        && let Err(resp) = validate_mentor(&storage, mentor_id).await
    {
        return Ok(resp);
    }

    match storage.update_group(group_id, update_data).await {
        Ok(Some(group)) => {
            info!("Group {} updated by {}", group.id, actor.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                group,
                "Group updated successfully",
            )))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::GroupNotFound,
            "Group not found",
        ))),
        Err(e) => Ok(internal_error("Failed to update group", e)),
    }
}
