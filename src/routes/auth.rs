use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::authz::Role;
use crate::middlewares;
use crate::models::users::requests::{UpdateProfileRequest, UserListQuery};
use crate::services::AuthService;

// 懒加载的全局 AuthService 实例
static AUTH_SERVICE: Lazy<AuthService> = Lazy::new(AuthService::new_lazy);

pub async fn get_me(request: HttpRequest) -> ActixResult<HttpResponse> {
    AUTH_SERVICE.get_me(&request).await
}

pub async fn update_profile(
    request: HttpRequest,
    profile_data: web::Json<UpdateProfileRequest>,
) -> ActixResult<HttpResponse> {
    AUTH_SERVICE
        .update_profile(profile_data.into_inner(), &request)
        .await
}

pub async fn list_users(
    request: HttpRequest,
    query: web::Query<UserListQuery>,
) -> ActixResult<HttpResponse> {
    AUTH_SERVICE.list_users(query.into_inner(), &request).await
}

// 配置路由
pub fn configure_auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/auth")
            .wrap(middlewares::RequireJWT)
            .route("/me", web::get().to(get_me))
            .route("/profile", web::put().to(update_profile))
            .route(
                "/users",
                web::get()
                    .to(list_users)
                    // 用户目录仅管理员可见
                    .wrap(middlewares::RequireRole::new(Role::Admin)),
            ),
    );
}
