use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{StorageService, access_denied, invalid_path, object_not_found, parse_bucket};
use crate::authz::{ObjectOp, can_access_object};
use crate::models::ApiResponse;
use crate::services::{internal_error, require_actor};
use crate::utils::validate::{split_bucket_path, validate_object_path};

pub async fn delete_object(
    service: &StorageService,
    request: &HttpRequest,
    full_path: &str,
) -> ActixResult<HttpResponse> {
    let actor = match require_actor(request) {
        Ok(actor) => actor,
        Err(resp) => return Ok(resp),
    };

    let (bucket, path) = match split_bucket_path(full_path) {
        Ok(parts) => parts,
        Err(msg) => return Ok(invalid_path(msg)),
    };

    let bucket = match parse_bucket(bucket) {
        Ok(bucket) => bucket,
        Err(resp) => return Ok(resp),
    };

    if let Err(msg) = validate_object_path(path) {
        return Ok(invalid_path(msg));
    }

    if !can_access_object(&actor, ObjectOp::Delete, bucket.as_str(), path) {
        return Ok(access_denied(bucket));
    }

    let store = service.get_object_store(request);
    match store.delete(bucket.as_str(), path).await {
        Ok(true) => {
            info!("Object {}/{} deleted by {}", bucket, path, actor.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("File deleted successfully")))
        }
        Ok(false) => Ok(object_not_found()),
        Err(e) => Ok(internal_error("Failed to delete object", e)),
    }
}
