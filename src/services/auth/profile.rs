use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use crate::authz::{Action, Resource, SessionContext, can};
use crate::middlewares::{RequireJWT, require_jwt::invalidate_profile};
use crate::models::users::requests::UpdateProfileRequest;
use crate::models::{ApiResponse, ErrorCode};

use super::AuthService;

// 会话检查：必须已登录且能对自己的资料执行 action
fn own_profile_session(request: &HttpRequest, action: Action) -> Result<SessionContext, HttpResponse> {
    let session = RequireJWT::extract_session(request).ok_or_else(|| {
        HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            "Unauthorized: missing session",
        ))
    })?;

    let resource = Resource::Profile {
        user_id: session.user.id,
    };
    if !can(&session.actor, action, &resource) {
        return Err(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::Forbidden,
            "You cannot access this profile",
        )));
    }
    Ok(session)
}

pub async fn handle_get_me(
    _service: &AuthService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    match own_profile_session(request, Action::Read) {
        Ok(session) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            session.user,
            "Profile retrieved successfully",
        ))),
        Err(resp) => Ok(resp),
    }
}

pub async fn handle_update_profile(
    service: &AuthService,
    update_data: UpdateProfileRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let session = match own_profile_session(request, Action::Update) {
        Ok(session) => session,
        Err(resp) => return Ok(resp),
    };

    // 没有可更新的字段时直接返回当前资料
    if update_data.is_empty() {
        return Ok(HttpResponse::Ok().json(ApiResponse::success(
            session.user,
            "Nothing to update",
        )));
    }

    let storage = service.get_storage(request);
    match storage.update_profile(session.user.id, update_data).await {
        Ok(Some(user)) => {
            invalidate_profile(&service.get_cache(request), user.id).await;
            info!("Profile updated for {}", user.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                user,
                "Profile updated successfully",
            )))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::UserNotFound,
            "User not found",
        ))),
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::ProfileUpdateFailed,
                format!("Failed to update profile: {e}"),
            )),
        ),
    }
}
