use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::authz::Role;
use crate::middlewares;
use crate::models::resources::requests::{
    CreateResourceRequest, ResourceListQuery, ResourceSearchQuery, UpdateResourceRequest,
};
use crate::services::ResourceService;
use crate::utils::SafeResourceId;

// 懒加载的全局 ResourceService 实例
static RESOURCE_SERVICE: Lazy<ResourceService> = Lazy::new(ResourceService::new_lazy);

pub async fn list_resources(
    req: HttpRequest,
    query: web::Query<ResourceListQuery>,
) -> ActixResult<HttpResponse> {
    RESOURCE_SERVICE
        .list_resources(&req, query.into_inner())
        .await
}

pub async fn create_resource(
    req: HttpRequest,
    resource_data: web::Json<CreateResourceRequest>,
) -> ActixResult<HttpResponse> {
    RESOURCE_SERVICE
        .create_resource(&req, resource_data.into_inner())
        .await
}

pub async fn search_resources(
    req: HttpRequest,
    query: web::Query<ResourceSearchQuery>,
) -> ActixResult<HttpResponse> {
    RESOURCE_SERVICE
        .search_resources(&req, query.into_inner())
        .await
}

pub async fn list_favorites(req: HttpRequest) -> ActixResult<HttpResponse> {
    RESOURCE_SERVICE.list_favorites(&req).await
}

pub async fn get_resource(
    req: HttpRequest,
    resource_id: SafeResourceId,
) -> ActixResult<HttpResponse> {
    RESOURCE_SERVICE.get_resource(&req, resource_id.0).await
}

pub async fn update_resource(
    req: HttpRequest,
    resource_id: SafeResourceId,
    update_data: web::Json<UpdateResourceRequest>,
) -> ActixResult<HttpResponse> {
    RESOURCE_SERVICE
        .update_resource(&req, resource_id.0, update_data.into_inner())
        .await
}

pub async fn delete_resource(
    req: HttpRequest,
    resource_id: SafeResourceId,
) -> ActixResult<HttpResponse> {
    RESOURCE_SERVICE.delete_resource(&req, resource_id.0).await
}

pub async fn add_favorite(
    req: HttpRequest,
    resource_id: SafeResourceId,
) -> ActixResult<HttpResponse> {
    RESOURCE_SERVICE.add_favorite(&req, resource_id.0).await
}

pub async fn remove_favorite(
    req: HttpRequest,
    resource_id: SafeResourceId,
) -> ActixResult<HttpResponse> {
    RESOURCE_SERVICE.remove_favorite(&req, resource_id.0).await
}

// 配置路由
pub fn configure_resources_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/resources")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("").route(web::get().to(list_resources)).route(
                    web::post()
                        .to(create_resource)
                        .wrap(middlewares::RequireRole::new_any(&[Role::Admin, Role::Mentor])),
                ),
            )
            // 固定路径需在 /{resource_id} 之前注册
            .route(
                "/search",
                web::get()
                    .to(search_resources)
                    .wrap(middlewares::RateLimit::search()),
            )
            .route("/favorites", web::get().to(list_favorites))
            .service(
                web::resource("/{resource_id}")
                    .route(web::get().to(get_resource))
                    .route(web::put().to(update_resource))
                    .route(web::delete().to(delete_resource)),
            )
            .service(
                web::resource("/{resource_id}/favorite")
                    .route(web::post().to(add_favorite))
                    .route(web::delete().to(remove_favorite)),
            ),
    );
}
