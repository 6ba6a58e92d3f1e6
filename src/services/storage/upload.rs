use actix_multipart::Multipart;
use actix_web::{
    HttpRequest, HttpResponse, Result as ActixResult,
    http::header,
    web::{self, Bytes},
};
use futures_util::{Stream, StreamExt, TryStreamExt};
use std::fmt::Display;
use tracing::{info, warn};

use super::{StorageService, access_denied, invalid_path, parse_bucket, signed_url};
use crate::authz::{ObjectOp, can_access_object};
use crate::config::AppConfig;
use crate::models::{
    ApiResponse, ErrorCode,
    objects::{
        requests::UploadUrlRequest,
        responses::{UploadUrlResponse, UploadedObject},
    },
};
use crate::services::{internal_error, require_actor};
use crate::utils::jwt::{JwtUtils, ObjectTokenPurpose};
use crate::utils::validate::{build_object_path, validate_folder, validate_object_path};

pub async fn create_upload_url(
    request: &HttpRequest,
    upload_data: UploadUrlRequest,
) -> ActixResult<HttpResponse> {
    let actor = match require_actor(request) {
        Ok(actor) => actor,
        Err(resp) => return Ok(resp),
    };

    if upload_data.file_name.trim().is_empty()
        || upload_data.file_type.trim().is_empty()
        || upload_data.bucket.trim().is_empty()
    {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            "file_name, file_type and bucket are required",
        )));
    }

    let bucket = match parse_bucket(upload_data.bucket.trim()) {
        Ok(bucket) => bucket,
        Err(resp) => return Ok(resp),
    };

    let folder = upload_data.folder.as_deref();
    if let Some(folder) = folder
        && let Err(msg) = validate_folder(folder)
    {
        return Ok(invalid_path(msg));
    }

    let path = build_object_path(
        folder,
        actor.id,
        upload_data.file_name.trim(),
        chrono::Utc::now(),
    );

    if !can_access_object(&actor, ObjectOp::Upload, bucket.as_str(), &path) {
        return Ok(access_denied(bucket));
    }

    let token = match JwtUtils::sign_object_token(
        ObjectTokenPurpose::Upload,
        bucket.as_str(),
        &path,
        &actor.id.to_string(),
    ) {
        Ok(token) => token,
        Err(e) => return Ok(internal_error("Failed to sign upload URL", e)),
    };

    let config = AppConfig::get();
    info!("Upload URL issued for {}/{} to {}", bucket, path, actor.id);

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        UploadUrlResponse {
            upload_url: signed_url(&config.upload.public_base_url, "upload", &token),
            file_path: path,
            token,
            expires_in: config.upload.signed_url_expiry,
        },
        "Upload URL created successfully",
    )))
}

pub async fn upload_object(
    service: &StorageService,
    request: &HttpRequest,
    token: &str,
    payload: web::Payload,
) -> ActixResult<HttpResponse> {
    let claims = match JwtUtils::verify_object_token(token, ObjectTokenPurpose::Upload) {
        Ok(claims) => claims,
        Err(e) => {
            warn!("Rejected upload token: {}", e);
            return Ok(HttpResponse::Unauthorized().json(ApiResponse::error_empty(
                ErrorCode::SignedUrlInvalid,
                "Invalid or expired upload URL",
            )));
        }
    };

    if let Err(msg) = validate_object_path(&claims.path) {
        return Ok(invalid_path(msg));
    }

    let max_size = AppConfig::get().upload.max_size;
    let data = match read_upload_body(request, payload, max_size).await {
        Ok(data) => data,
        Err(resp) => return Ok(resp),
    };

    let store = service.get_object_store(request);
    match store.put(&claims.bucket, &claims.path, data).await {
        Ok(size) => {
            info!(
                "Object {}/{} stored ({} bytes) by {}",
                claims.bucket, claims.path, size, claims.sub
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                UploadedObject {
                    bucket: claims.bucket,
                    path: claims.path,
                    size,
                },
                "File uploaded successfully",
            )))
        }
        Err(e) => Ok(internal_error("Failed to store object", e)),
    }
}

// multipart 时取 `file` 字段，否则整个请求体就是文件内容
async fn read_upload_body(
    request: &HttpRequest,
    payload: web::Payload,
    max_size: usize,
) -> Result<Vec<u8>, HttpResponse> {
    let is_multipart = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("multipart/form-data"));

    if !is_multipart {
        return collect_limited(payload, max_size).await;
    }

    let mut multipart = Multipart::new(request.headers(), payload);
    loop {
        match multipart.try_next().await {
            Ok(Some(field)) => {
                let is_file = field
                    .content_disposition()
                    .and_then(|cd| cd.get_name())
                    .is_some_and(|name| name == "file");
                if is_file {
                    return collect_limited(field, max_size).await;
                }
            }
            Ok(None) => {
                return Err(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                    ErrorCode::BadRequest,
                    "No file found in upload payload",
                )));
            }
            Err(e) => return Err(body_error(e)),
        }
    }
}

async fn collect_limited<S, E>(stream: S, max_size: usize) -> Result<Vec<u8>, HttpResponse>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: Display,
{
    let mut stream = std::pin::pin!(stream);
    let mut data = Vec::new();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(body_error)?;
        if data.len() + chunk.len() > max_size {
            return Err(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::FileSizeExceeded,
                "File size exceeds the limit",
            )));
        }
        data.extend_from_slice(&chunk);
    }
    Ok(data)
}

fn body_error(e: impl Display) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiResponse::error_empty(
        ErrorCode::BadRequest,
        format!("Failed to read upload body: {e}"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;

    fn chunks(parts: &[&'static [u8]]) -> impl Stream<Item = Result<Bytes, String>> {
        stream::iter(
            parts
                .iter()
                .map(|p| Ok(Bytes::from_static(*p)))
                .collect::<Vec<_>>(),
        )
    }

    #[actix_web::test]
    async fn test_collect_limited_joins_chunks() {
        let data = collect_limited(chunks(&[b"hello ".as_slice(), b"world".as_slice()]), 64)
            .await
            .unwrap();
        assert_eq!(data, b"hello world");
    }

    #[actix_web::test]
    async fn test_collect_limited_rejects_oversized_body() {
        let resp = collect_limited(chunks(&[b"0123456789".as_slice(), b"abc".as_slice()]), 12)
            .await
            .unwrap_err();
        assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);
    }
}
