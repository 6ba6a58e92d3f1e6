use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::GroupService;
use crate::authz::Role;
use crate::models::{ApiResponse, groups::responses::GroupListResponse};
use crate::services::{internal_error, require_actor};

pub async fn list_groups(
    service: &GroupService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let actor = match require_actor(request) {
        Ok(actor) => actor,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    // 导师只看自己负责的小组，学生只看自己加入的小组
    let result = match actor.role {
        Role::Admin | Role::School => storage.list_groups().await,
        Role::Mentor => storage.list_groups_by_mentor(actor.id).await,
        Role::Student => storage.list_groups_by_student(actor.id).await,
    };

    match result {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            GroupListResponse { items },
            "Group list retrieved successfully",
        ))),
        Err(e) => Ok(internal_error("Failed to retrieve group list", e)),
    }
}
