use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;
use uuid::Uuid;

use super::GroupService;
use crate::authz::{Action, GroupFacts, Resource, can};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{internal_error, require_actor};

pub async fn delete_group(
    service: &GroupService,
    request: &HttpRequest,
    group_id: Uuid,
) -> ActixResult<HttpResponse> {
    let actor = match require_actor(request) {
        Ok(actor) => actor,
        Err(resp) => return Ok(resp),
    };

    if !can(&actor, Action::Delete, &Resource::Group(GroupFacts::default())) {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::GroupPermissionDenied,
            "Only admins can delete groups",
        )));
    }

    let storage = service.get_storage(request);

    match storage.delete_group(group_id).await {
        Ok(true) => {
            info!("Group {} deleted by {}", group_id, actor.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Group deleted successfully")))
        }
        Ok(false) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::GroupNotFound,
            "Group not found",
        ))),
        Err(e) => Ok(internal_error("Failed to delete group", e)),
    }
}
