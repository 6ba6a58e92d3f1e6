use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use super::{ResourceService, resource_not_found};
use crate::authz::{Action, Actor, Resource, can};
use crate::models::{ApiResponse, ErrorCode, resources::requests::UpdateResourceRequest};
use crate::services::{internal_error, require_actor};
use crate::storage::Storage;

// 资源存在且 actor 有权执行 action 时返回 Ok
async fn authorize(
    storage: &Arc<dyn Storage>,
    actor: &Actor,
    action: Action,
    resource_id: Uuid,
) -> Result<(), HttpResponse> {
    let resource = match storage.get_resource_by_id(resource_id).await {
        Ok(Some(resource)) => resource,
        Ok(None) => return Err(resource_not_found()),
        Err(e) => return Err(internal_error("Failed to get resource", e)),
    };

    let target = Resource::LearningResource {
        uploaded_by: resource.uploaded_by,
    };
    if can(actor, action, &target) {
        Ok(())
    } else {
        Err(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::ResourcePermissionDenied,
            "Only the uploader or an admin can modify this resource",
        )))
    }
}

pub async fn update_resource(
    service: &ResourceService,
    request: &HttpRequest,
    resource_id: Uuid,
    update_data: UpdateResourceRequest,
) -> ActixResult<HttpResponse> {
    let actor = match require_actor(request) {
        Ok(actor) => actor,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    if let Err(resp) = authorize(&storage, &actor, Action::Update, resource_id).await {
        return Ok(resp);
    }

    if update_data.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            "Resource title must not be empty",
        )));
    }

    match storage.update_resource(resource_id, update_data).await {
        Ok(Some(resource)) => {
            info!("Resource {} updated by {}", resource.id, actor.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                resource,
                "Resource updated successfully",
            )))
        }
        Ok(None) => Ok(resource_not_found()),
        Err(e) => Ok(internal_error("Failed to update resource", e)),
    }
}

pub async fn delete_resource(
    service: &ResourceService,
    request: &HttpRequest,
    resource_id: Uuid,
) -> ActixResult<HttpResponse> {
    let actor = match require_actor(request) {
        Ok(actor) => actor,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    if let Err(resp) = authorize(&storage, &actor, Action::Delete, resource_id).await {
        return Ok(resp);
    }

    match storage.delete_resource(resource_id).await {
        Ok(true) => {
            info!("Resource {} deleted by {}", resource_id, actor.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Resource deleted successfully")))
        }
        Ok(false) => Ok(resource_not_found()),
        Err(e) => Ok(internal_error("Failed to delete resource", e)),
    }
}
