use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::ResourceService;
use crate::models::{
    ApiResponse,
    resources::{requests::ResourceListQuery, responses::ResourceListResponse},
};
use crate::services::{internal_error, require_actor};

pub async fn list_resources(
    service: &ResourceService,
    request: &HttpRequest,
    query: ResourceListQuery,
) -> ActixResult<HttpResponse> {
    // 所有角色都可以浏览资源，只要求已登录
    if let Err(resp) = require_actor(request) {
        return Ok(resp);
    }

    let storage = service.get_storage(request);
    match storage.list_resources(query).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            ResourceListResponse { items },
            "Resources retrieved successfully",
        ))),
        Err(e) => Ok(internal_error("Failed to list resources", e)),
    }
}
