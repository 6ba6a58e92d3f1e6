use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::authz::Role;
use crate::middlewares;
use crate::models::works::requests::{
    CreateFeedbackRequest, CreateWorkRequest, UpdateWorkRequest, WorkListQuery,
};
use crate::services::WorkService;
use crate::utils::SafeWorkId;

// 懒加载的全局 WorkService 实例
static WORK_SERVICE: Lazy<WorkService> = Lazy::new(WorkService::new_lazy);

pub async fn list_works(
    req: HttpRequest,
    query: web::Query<WorkListQuery>,
) -> ActixResult<HttpResponse> {
    WORK_SERVICE.list_works(&req, query.into_inner()).await
}

pub async fn create_work(
    req: HttpRequest,
    work_data: web::Json<CreateWorkRequest>,
) -> ActixResult<HttpResponse> {
    WORK_SERVICE.create_work(&req, work_data.into_inner()).await
}

pub async fn get_work(req: HttpRequest, work_id: SafeWorkId) -> ActixResult<HttpResponse> {
    WORK_SERVICE.get_work(&req, work_id.0).await
}

pub async fn update_work(
    req: HttpRequest,
    work_id: SafeWorkId,
    update_data: web::Json<UpdateWorkRequest>,
) -> ActixResult<HttpResponse> {
    WORK_SERVICE
        .update_work(&req, work_id.0, update_data.into_inner())
        .await
}

pub async fn delete_work(req: HttpRequest, work_id: SafeWorkId) -> ActixResult<HttpResponse> {
    WORK_SERVICE.delete_work(&req, work_id.0).await
}

pub async fn create_feedback(
    req: HttpRequest,
    work_id: SafeWorkId,
    feedback_data: web::Json<CreateFeedbackRequest>,
) -> ActixResult<HttpResponse> {
    WORK_SERVICE
        .create_feedback(&req, work_id.0, feedback_data.into_inner())
        .await
}

// 配置路由
pub fn configure_works_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/works")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    .route(web::get().to(list_works))
                    .route(web::post().to(create_work)),
            )
            .service(
                web::resource("/{work_id}")
                    .route(web::get().to(get_work))
                    .route(web::put().to(update_work))
                    .route(web::delete().to(delete_work)),
            )
            .service(
                web::resource("/{work_id}/feedback").route(
                    web::post()
                        .to(create_feedback)
                        // 是否为该小组导师在服务层判断
                        .wrap(middlewares::RequireRole::new_any(&[Role::Admin, Role::Mentor])),
                ),
            ),
    );
}
