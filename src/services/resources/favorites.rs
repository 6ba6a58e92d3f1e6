use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use uuid::Uuid;

use super::{ResourceService, resource_not_found};
use crate::authz::{Action, Resource, can};
use crate::models::{
    ApiResponse, ErrorCode,
    resources::responses::ResourceListResponse,
};
use crate::services::{internal_error, require_actor};

pub async fn add_favorite(
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
    if !can(&actor, Action::Favorite, &target) {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::ResourcePermissionDenied,
            "You cannot favorite this resource",
        )));
    }

    match storage.add_favorite(actor.id, resource_id).await {
        Ok(favorite) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            favorite,
            "Resource added to favorites",
        ))),
        Err(e) => Ok(internal_error("Failed to add favorite", e)),
    }
}

pub async fn remove_favorite(
    service: &ResourceService,
    request: &HttpRequest,
    resource_id: Uuid,
) -> ActixResult<HttpResponse> {
    let actor = match require_actor(request) {
        Ok(actor) => actor,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    match storage.remove_favorite(actor.id, resource_id).await {
        Ok(true) => Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
            "Resource removed from favorites",
        ))),
        Ok(false) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::NotFound,
            "Favorite not found",
        ))),
        Err(e) => Ok(internal_error("Failed to remove favorite", e)),
    }
}

pub async fn list_favorites(
    service: &ResourceService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let actor = match require_actor(request) {
        Ok(actor) => actor,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    match storage.list_favorite_resources(actor.id).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            ResourceListResponse { items },
            "Favorites retrieved successfully",
        ))),
        Err(e) => Ok(internal_error("Failed to list favorites", e)),
    }
}
