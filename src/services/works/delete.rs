use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;
use uuid::Uuid;

use super::{WorkService, work_facts, work_not_found};
use crate::authz::{Action, Resource, can};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{internal_error, require_actor};

pub async fn delete_work(
    service: &WorkService,
    request: &HttpRequest,
    work_id: Uuid,
) -> ActixResult<HttpResponse> {
    let actor = match require_actor(request) {
        Ok(actor) => actor,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    let work = match storage.get_work_by_id(work_id).await {
        Ok(Some(work)) => work,
        Ok(None) => return Ok(work_not_found()),
        Err(e) => return Ok(internal_error("Failed to get work", e)),
    };

    let facts = match work_facts(&storage, &work).await {
        Ok(facts) => facts,
        Err(e) => return Ok(internal_error("Failed to get work group", e)),
    };

    if !can(&actor, Action::Delete, &Resource::Work(facts)) {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::WorkPermissionDenied,
            "You do not have permission to delete this work",
        )));
    }

    match storage.delete_work(work_id).await {
        Ok(true) => {
            info!("Work {} deleted by {}", work_id, actor.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Work deleted successfully")))
        }
        Ok(false) => Ok(work_not_found()),
        Err(e) => Ok(internal_error("Failed to delete work", e)),
    }
}
