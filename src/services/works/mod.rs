pub mod create;
pub mod delete;
pub mod feedback;
pub mod get;
pub mod list;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::authz::WorkFacts;
use crate::errors::Result;
use crate::models::works::{
    entities::Work,
    requests::{CreateFeedbackRequest, CreateWorkRequest, UpdateWorkRequest, WorkListQuery},
    responses::WorkWithFeedback,
};
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::Storage;

pub struct WorkService {
    storage: Option<Arc<dyn Storage>>,
}

/// 读取判断作品权限所需的事实（所在小组的导师）
pub(crate) async fn work_facts(storage: &Arc<dyn Storage>, work: &Work) -> Result<WorkFacts> {
    let group_mentor_id = match work.group_id {
        Some(group_id) => storage
            .get_group_by_id(group_id)
            .await?
            .and_then(|g| g.mentor_id),
        None => None,
    };
    Ok(WorkFacts {
        owner_id: work.user_id,
        group_mentor_id,
        status: work.status,
    })
}

/// 为作品附加反馈列表
pub(crate) async fn attach_feedback(
    storage: &Arc<dyn Storage>,
    works: Vec<Work>,
) -> Result<Vec<WorkWithFeedback>> {
    let ids: Vec<Uuid> = works.iter().map(|w| w.id).collect();
    let mut by_work: HashMap<Uuid, Vec<_>> = HashMap::new();
    if !ids.is_empty() {
        for feedback in storage.list_feedback_for_works(&ids).await? {
            by_work.entry(feedback.work_id).or_default().push(feedback);
        }
    }

    Ok(works
        .into_iter()
        .map(|work| {
            let feedback = by_work.remove(&work.id).unwrap_or_default();
            WorkWithFeedback { work, feedback }
        })
        .collect())
}

pub(crate) fn work_not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::error_empty(
        ErrorCode::WorkNotFound,
        "Work not found",
    ))
}

impl WorkService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        match &self.storage {
            Some(storage) => storage.clone(),
            None => super::storage_from_request(request),
        }
    }

    // 获取作品列表（按角色限定范围）
    pub async fn list_works(
        &self,
        request: &HttpRequest,
        query: WorkListQuery,
    ) -> ActixResult<HttpResponse> {
        list::list_works(self, request, query).await
    }

    pub async fn get_work(&self, request: &HttpRequest, work_id: Uuid) -> ActixResult<HttpResponse> {
        get::get_work(self, request, work_id).await
    }

    pub async fn create_work(
        &self,
        request: &HttpRequest,
        work_data: CreateWorkRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_work(self, request, work_data).await
    }

    pub async fn update_work(
        &self,
        request: &HttpRequest,
        work_id: Uuid,
        update_data: UpdateWorkRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_work(self, request, work_id, update_data).await
    }

    pub async fn delete_work(
        &self,
        request: &HttpRequest,
        work_id: Uuid,
    ) -> ActixResult<HttpResponse> {
        delete::delete_work(self, request, work_id).await
    }

    // 导师或管理员提交反馈
    pub async fn create_feedback(
        &self,
        request: &HttpRequest,
        work_id: Uuid,
        feedback_data: CreateFeedbackRequest,
    ) -> ActixResult<HttpResponse> {
        feedback::create_feedback(self, request, work_id, feedback_data).await
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! 作品服务测试共用的场景：一个小组，含导师和学生，学生提交了一份作品

    use actix_web::{HttpMessage, HttpRequest, HttpResponse, test::TestRequest, web};
    use std::sync::Arc;
    use uuid::Uuid;

    use crate::authz::SessionContext;
    use crate::models::groups::requests::CreateGroupRequest;
    use crate::models::users::{
        entities::{User, UserRole},
        requests::ProvisionProfileRequest,
    };
    use crate::models::works::{
        entities::{Work, WorkStatus},
        requests::CreateWorkRequest,
    };
    use crate::storage::{Storage, sea_orm_storage::SeaOrmStorage};

    pub struct Scene {
        pub storage: Arc<dyn Storage>,
        pub admin: User,
        pub mentor: User,
        pub other_mentor: User,
        pub student: User,
        pub work: Work,
    }

    async fn user(storage: &Arc<dyn Storage>, role: UserRole) -> User {
        let id = Uuid::new_v4();
        storage
            .provision_user(ProvisionProfileRequest {
                id,
                email: format!("{id}@example.com"),
                name: None,
                avatar_url: None,
                role,
            })
            .await
            .unwrap()
    }

    pub async fn scene(status: WorkStatus) -> Scene {
        let storage: Arc<dyn Storage> = Arc::new(SeaOrmStorage::in_memory().await);
        let admin = user(&storage, UserRole::Admin).await;
        let mentor = user(&storage, UserRole::Mentor).await;
        let other_mentor = user(&storage, UserRole::Mentor).await;
        let student = user(&storage, UserRole::Student).await;

        let group = storage
            .create_group(CreateGroupRequest {
                name: "Tsuchiura".into(),
                description: None,
                mentor_id: Some(mentor.id),
                student_ids: vec![student.id],
            })
            .await
            .unwrap();

        let work = storage
            .create_work(
                student.id,
                CreateWorkRequest {
                    title: "Day 1".into(),
                    description: Some("Visited the market".into()),
                    work_type: "report".into(),
                    group_id: Some(group.id),
                    ..Default::default()
                },
                status,
            )
            .await
            .unwrap();

        Scene {
            storage,
            admin,
            mentor,
            other_mentor,
            student,
            work,
        }
    }

    pub fn request_as(storage: &Arc<dyn Storage>, user: &User) -> HttpRequest {
        let req = TestRequest::default()
            .app_data(web::Data::new(storage.clone()))
            .to_http_request();
        req.extensions_mut()
            .insert(SessionContext::new(user.clone(), 0));
        req
    }

    pub async fn body_json(resp: HttpResponse) -> serde_json::Value {
        let body = actix_web::body::to_bytes(resp.into_body()).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }
}
