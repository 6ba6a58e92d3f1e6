use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::WorkService;
use crate::authz::{Action, Resource, WorkFacts, can};
use crate::models::{
    ApiResponse, ErrorCode,
    works::{entities::WorkStatus, requests::CreateWorkRequest},
};
use crate::services::{internal_error, require_actor};

pub async fn create_work(
    service: &WorkService,
    request: &HttpRequest,
    mut work_data: CreateWorkRequest,
) -> ActixResult<HttpResponse> {
    let actor = match require_actor(request) {
        Ok(actor) => actor,
        Err(resp) => return Ok(resp),
    };

    // 新作品的所有者就是当前用户
    let facts = WorkFacts {
        owner_id: actor.id,
        group_mentor_id: None,
        status: WorkStatus::Submitted,
    };
    if !can(&actor, Action::Create, &Resource::Work(facts)) {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::WorkPermissionDenied,
            "Only students can create works",
        )));
    }

    work_data.title = work_data.title.trim().to_string();
    work_data.work_type = work_data.work_type.trim().to_string();
    if work_data.title.is_empty() || work_data.work_type.is_empty() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            "Title and type are required",
        )));
    }

    let storage = service.get_storage(request);

    if let Some(group_id) = work_data.group_id {
        match storage.is_group_member(group_id, actor.id).await {
            Ok(true) => {}
            Ok(false) => {
                return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                    ErrorCode::GroupMemberInvalid,
                    "You are not a member of this group",
                )));
            }
            Err(e) => return Ok(internal_error("Failed to check group membership", e)),
        }
    }

    // 客户端提交的状态一律忽略
    work_data.status = None;

    match storage
        .create_work(actor.id, work_data, WorkStatus::Submitted)
        .await
    {
        Ok(work) => {
            info!("Work {} created by {}", work.id, actor.id);
            Ok(HttpResponse::Created().json(ApiResponse::success(
                work,
                "Work created successfully",
            )))
        }
        Err(e) => Ok(internal_error("Failed to create work", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{HttpMessage, test::TestRequest, web};
    use std::sync::Arc;

    use crate::authz::SessionContext;
    use crate::models::users::{entities::UserRole, requests::ProvisionProfileRequest};
    use crate::storage::{Storage, sea_orm_storage::SeaOrmStorage};

    async fn request_as(role: UserRole) -> HttpRequest {
        let storage: Arc<dyn Storage> = Arc::new(SeaOrmStorage::in_memory().await);
        let id = uuid::Uuid::new_v4();
        let user = storage
            .provision_user(ProvisionProfileRequest {
                id,
                email: format!("{id}@example.com"),
                name: None,
                avatar_url: None,
                role,
            })
            .await
            .unwrap();

        let req = TestRequest::default()
            .app_data(web::Data::new(storage))
            .to_http_request();
        req.extensions_mut().insert(SessionContext::new(user, 0));
        req
    }

    fn work(status: Option<WorkStatus>) -> CreateWorkRequest {
        CreateWorkRequest {
            title: "Day 1".into(),
            work_type: "report".into(),
            status,
            ..Default::default()
        }
    }

    #[actix_web::test]
    async fn test_student_work_always_starts_submitted() {
        let req = request_as(UserRole::Student).await;
        let resp = create_work(&WorkService::new_lazy(), &req, work(Some(WorkStatus::Reviewed)))
            .await
            .unwrap();
        assert_eq!(resp.status(), actix_web::http::StatusCode::CREATED);

        let body = actix_web::body::to_bytes(resp.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["data"]["status"], "submitted");
    }

    #[actix_web::test]
    async fn test_mentor_cannot_create_work() {
        let req = request_as(UserRole::Mentor).await;
        let resp = create_work(&WorkService::new_lazy(), &req, work(None))
            .await
            .unwrap();
        assert_eq!(resp.status(), actix_web::http::StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn test_title_and_type_required() {
        let req = request_as(UserRole::Student).await;
        let resp = create_work(&WorkService::new_lazy(), &req, CreateWorkRequest::default())
            .await
            .unwrap();
        assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);
    }
}
