use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::objects::requests::{ObjectListQuery, UploadUrlRequest};
use crate::services::StorageService;

// 懒加载的全局 StorageService 实例
static STORAGE_SERVICE: Lazy<StorageService> = Lazy::new(StorageService::new_lazy);

pub async fn create_upload_url(
    req: HttpRequest,
    upload_data: web::Json<UploadUrlRequest>,
) -> ActixResult<HttpResponse> {
    STORAGE_SERVICE
        .create_upload_url(&req, upload_data.into_inner())
        .await
}

pub async fn upload_object(
    req: HttpRequest,
    token: web::Path<String>,
    payload: web::Payload,
) -> ActixResult<HttpResponse> {
    STORAGE_SERVICE
        .upload_object(&req, &token.into_inner(), payload)
        .await
}

pub async fn create_download_url(
    req: HttpRequest,
    path: web::Path<(String, String)>,
) -> ActixResult<HttpResponse> {
    let (bucket, object_path) = path.into_inner();
    STORAGE_SERVICE
        .create_download_url(&req, &bucket, &object_path)
        .await
}

pub async fn download_object(
    req: HttpRequest,
    token: web::Path<String>,
) -> ActixResult<HttpResponse> {
    STORAGE_SERVICE
        .download_object(&req, &token.into_inner())
        .await
}

pub async fn list_objects(
    req: HttpRequest,
    bucket: web::Path<String>,
    query: web::Query<ObjectListQuery>,
) -> ActixResult<HttpResponse> {
    STORAGE_SERVICE
        .list_objects(&req, &bucket.into_inner(), query.into_inner())
        .await
}

pub async fn delete_object(
    req: HttpRequest,
    full_path: web::Path<String>,
) -> ActixResult<HttpResponse> {
    STORAGE_SERVICE
        .delete_object(&req, &full_path.into_inner())
        .await
}

// 配置路由
pub fn configure_storage_routes(cfg: &mut web::ServiceConfig) {
    // 签名地址自带授权，不经过 JWT；必须先于 /api/v1/storage 注册
    cfg.service(
        web::scope("/api/v1/storage/object")
            .route("/upload/{token}", web::put().to(upload_object))
            .route("/download/{token}", web::get().to(download_object)),
    );

    cfg.service(
        web::scope("/api/v1/storage")
            .wrap(middlewares::RequireJWT)
            .route(
                "/upload",
                web::post()
                    .to(create_upload_url)
                    .wrap(middlewares::RateLimit::file_upload()),
            )
            .route(
                "/download/{bucket}/{path:.+}",
                web::get().to(create_download_url),
            )
            .route("/list/{bucket}", web::get().to(list_objects))
            .route("/{full_path:.+}", web::delete().to(delete_object)),
    );
}
