pub mod auth;
pub mod groups;
pub mod messages;
pub mod resources;
pub mod storage;
pub mod works;

pub use auth::AuthService;
pub use groups::GroupService;
pub use messages::MessageService;
pub use resources::ResourceService;
pub use storage::StorageService;
pub use works::WorkService;

use actix_web::{HttpRequest, HttpResponse};
use std::sync::Arc;
use tracing::error;

use crate::authz::Actor;
use crate::middlewares::RequireJWT;
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::Storage;

// 从 app data 中取出存储实例
pub(crate) fn storage_from_request(request: &HttpRequest) -> Arc<dyn Storage> {
    request
        .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
        .expect("Storage not found in app data")
        .get_ref()
        .clone()
}

// 取出当前请求的 Actor，缺失时返回 401 响应
pub(crate) fn require_actor(request: &HttpRequest) -> Result<Actor, HttpResponse> {
    RequireJWT::extract_actor(request).ok_or_else(|| {
        HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            "Unauthorized: missing session",
        ))
    })
}

// 数据库或上游错误统一返回 500，消息中保留原始错误
pub(crate) fn internal_error(context: &str, e: impl std::fmt::Display) -> HttpResponse {
    let msg = format!("{context}: {e}");
    error!("{}", msg);
    HttpResponse::InternalServerError()
        .json(ApiResponse::error_empty(ErrorCode::InternalServerError, msg))
}
