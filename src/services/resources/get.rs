use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use uuid::Uuid;

use super::{ResourceService, resource_not_found};
use crate::authz::{Action, Resource, can};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{internal_error, require_actor};

pub async fn get_resource(
    service: &ResourceService,
    request: &HttpRequest,
    resource_id: Uuid,
) -> ActixResult<HttpResponse> {
    let actor = match require_actor(request) {
        Ok(actor) => actor,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    let resource = match storage.get_resource_by_id(resource_id).await {
        Ok(Some(resource)) => resource,
        Ok(None) => return Ok(resource_not_found()),
        Err(e) => return Ok(internal_error("Failed to get resource", e)),
    };

    let target = Resource::LearningResource {
        uploaded_by: resource.uploaded_by,
    };
    if !can(&actor, Action::Read, &target) {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::ResourcePermissionDenied,
            "You do not have access to this resource",
        )));
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        resource,
        "Resource retrieved successfully",
    )))
}
