use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{StorageService, access_denied, invalid_path, parse_bucket};
use crate::authz::{ObjectOp, can_access_object};
use crate::models::{
    ApiResponse,
    objects::{requests::ObjectListQuery, responses::ObjectListResponse},
};
use crate::services::{internal_error, require_actor};
use crate::utils::validate::validate_folder;

pub async fn list_objects(
    service: &StorageService,
    request: &HttpRequest,
    bucket: &str,
    query: ObjectListQuery,
) -> ActixResult<HttpResponse> {
    let actor = match require_actor(request) {
        Ok(actor) => actor,
        Err(resp) => return Ok(resp),
    };

    let bucket = match parse_bucket(bucket) {
        Ok(bucket) => bucket,
        Err(resp) => return Ok(resp),
    };

    let folder = query
        .folder
        .as_deref()
        .unwrap_or("")
        .trim_matches('/')
        .to_string();
    if let Err(msg) = validate_folder(&folder) {
        return Ok(invalid_path(msg));
    }

    if !can_access_object(&actor, ObjectOp::List, bucket.as_str(), &folder) {
        return Ok(access_denied(bucket));
    }

    let store = service.get_object_store(request);
    match store
        .list(bucket.as_str(), &folder, query.limit(), query.offset())
        .await
    {
        Ok(files) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            ObjectListResponse {
                total: files.len(),
                files,
                bucket: bucket.to_string(),
                folder,
            },
            "Files retrieved successfully",
        ))),
        Err(e) => Ok(internal_error("Failed to list objects", e)),
    }
}
