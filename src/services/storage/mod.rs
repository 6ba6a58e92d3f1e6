pub mod delete;
pub mod download;
pub mod list;
pub mod upload;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use std::sync::Arc;

use crate::authz::Bucket;
use crate::models::{
    ApiResponse, ErrorCode,
    objects::requests::{ObjectListQuery, UploadUrlRequest},
};
use crate::object_store::ObjectStore;

pub struct StorageService {
    object_store: Option<Arc<dyn ObjectStore>>,
}

/// 解析 bucket 名称，未知 bucket 一律拒绝
pub(crate) fn parse_bucket(name: &str) -> Result<Bucket, HttpResponse> {
    name.parse::<Bucket>().map_err(|_| {
        HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::BucketNotFound,
            format!("Unknown bucket: {name}"),
        ))
    })
}

pub(crate) fn access_denied(bucket: Bucket) -> HttpResponse {
    HttpResponse::Forbidden().json(ApiResponse::error_empty(
        ErrorCode::StoragePermissionDenied,
        format!("Access denied to bucket {bucket}"),
    ))
}

pub(crate) fn invalid_path(msg: &str) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::ObjectPathInvalid, msg))
}

pub(crate) fn object_not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::error_empty(
        ErrorCode::ObjectNotFound,
        "Object not found",
    ))
}

/// 拼接签名对象 URL
pub(crate) fn signed_url(base: &str, kind: &str, token: &str) -> String {
    format!(
        "{}/api/v1/storage/object/{kind}/{token}",
        base.trim_end_matches('/')
    )
}

impl StorageService {
    pub fn new_lazy() -> Self {
        Self { object_store: None }
    }

    pub(crate) fn get_object_store(&self, request: &HttpRequest) -> Arc<dyn ObjectStore> {
        match &self.object_store {
            Some(store) => store.clone(),
            None => request
                .app_data::<web::Data<Arc<dyn ObjectStore>>>()
                .expect("Object store not found in app data")
                .get_ref()
                .clone(),
        }
    }

    // 申请签名上传地址
    pub async fn create_upload_url(
        &self,
        request: &HttpRequest,
        upload_data: UploadUrlRequest,
    ) -> ActixResult<HttpResponse> {
        upload::create_upload_url(request, upload_data).await
    }

    // 通过签名令牌写入对象
    pub async fn upload_object(
        &self,
        request: &HttpRequest,
        token: &str,
        payload: web::Payload,
    ) -> ActixResult<HttpResponse> {
        upload::upload_object(self, request, token, payload).await
    }

    // 申请签名下载地址
    pub async fn create_download_url(
        &self,
        request: &HttpRequest,
        bucket: &str,
        path: &str,
    ) -> ActixResult<HttpResponse> {
        download::create_download_url(request, bucket, path).await
    }

    // 通过签名令牌读取对象
    pub async fn download_object(
        &self,
        request: &HttpRequest,
        token: &str,
    ) -> ActixResult<HttpResponse> {
        download::download_object(self, request, token).await
    }

    pub async fn list_objects(
        &self,
        request: &HttpRequest,
        bucket: &str,
        query: ObjectListQuery,
    ) -> ActixResult<HttpResponse> {
        list::list_objects(self, request, bucket, query).await
    }

    // 删除对象，`full_path` 形如 `{bucket}/{path..}`
    pub async fn delete_object(
        &self,
        request: &HttpRequest,
        full_path: &str,
    ) -> ActixResult<HttpResponse> {
        delete::delete_object(self, request, full_path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_url_trims_trailing_slash() {
        assert_eq!(
            signed_url("http://localhost:8080/", "upload", "abc"),
            "http://localhost:8080/api/v1/storage/object/upload/abc"
        );
    }

    #[test]
    fn test_unknown_bucket_rejected() {
        assert!(parse_bucket("works").is_ok());
        let resp = parse_bucket("secrets").unwrap_err();
        assert_eq!(resp.status(), actix_web::http::StatusCode::FORBIDDEN);
    }
}
