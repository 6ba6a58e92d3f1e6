use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::AuthService;
use crate::authz::{Action, Resource, can};
use crate::models::{
    ApiResponse, ErrorCode,
    users::{requests::UserListQuery, responses::UserListResponse},
};
use crate::services::{internal_error, require_actor};

pub async fn list_users(
    service: &AuthService,
    query: UserListQuery,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let actor = match require_actor(request) {
        Ok(actor) => actor,
        Err(resp) => return Ok(resp),
    };

    if !can(&actor, Action::Read, &Resource::UserDirectory) {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::Forbidden,
            "Admin access required",
        )));
    }

    let storage = service.get_storage(request);
    match storage.list_users(query.role).await {
        Ok(items) => {
            let total = items.len() as i64;
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                UserListResponse { items, total },
                "User list retrieved successfully",
            )))
        }
        Err(e) => Ok(internal_error("Failed to retrieve user list", e)),
    }
}
