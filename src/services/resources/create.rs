use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::ResourceService;
use crate::authz::{Action, Resource, can};
use crate::models::{ApiResponse, ErrorCode, resources::requests::CreateResourceRequest};
use crate::services::{internal_error, require_actor};

pub async fn create_resource(
    service: &ResourceService,
    request: &HttpRequest,
    mut resource_data: CreateResourceRequest,
) -> ActixResult<HttpResponse> {
    let actor = match require_actor(request) {
        Ok(actor) => actor,
        Err(resp) => return Ok(resp),
    };

    let target = Resource::LearningResource {
        uploaded_by: Some(actor.id),
    };
    if !can(&actor, Action::Create, &target) {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::ResourcePermissionDenied,
            "Only admins and mentors can create resources",
        )));
    }

    resource_data.title = resource_data.title.trim().to_string();
    if resource_data.title.is_empty() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            "Resource title is required",
        )));
    }

    let storage = service.get_storage(request);
    match storage.create_resource(actor.id, resource_data).await {
        Ok(resource) => {
            info!("Resource {} created by {}", resource.id, actor.id);
            Ok(HttpResponse::Created().json(ApiResponse::success(
                resource,
                "Resource created successfully",
            )))
        }
        Err(e) => Ok(internal_error("Failed to create resource", e)),
    }
}
