use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use uuid::Uuid;

use super::{WorkService, attach_feedback, work_facts, work_not_found};
use crate::authz::{Action, Resource, can};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{internal_error, require_actor};

pub async fn get_work(
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

    if !can(&actor, Action::Read, &Resource::Work(facts)) {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::WorkPermissionDenied,
            "You do not have access to this work",
        )));
    }

    match attach_feedback(&storage, vec![work]).await {
        Ok(mut items) => match items.pop() {
            Some(item) => Ok(HttpResponse::Ok().json(ApiResponse::success(
                item,
                "Work retrieved successfully",
            ))),
            None => Ok(work_not_found()),
        },
        Err(e) => Ok(internal_error("Failed to load feedback", e)),
    }
}
