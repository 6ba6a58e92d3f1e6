use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;
use uuid::Uuid;

use super::{WorkService, work_facts, work_not_found};
use crate::authz::{Action, Actor, Resource, Role, can};
use crate::models::{
    ApiResponse, ErrorCode,
    works::{entities::WorkStatus, requests::UpdateWorkRequest},
};
use crate::services::{internal_error, require_actor};

/// 字段级检查失败的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FieldViolation {
    /// 导师只能修改状态
    MentorNonStatusField,
    /// 学生不能修改状态
    StudentStatusField,
    /// 状态不能回退
    BackwardTransition,
}

impl FieldViolation {
    fn into_response(self) -> HttpResponse {
        let (code, msg) = match self {
            FieldViolation::MentorNonStatusField => (
                ErrorCode::WorkFieldNotAllowed,
                "Mentors can only update the status field",
            ),
            FieldViolation::StudentStatusField => (
                ErrorCode::WorkFieldNotAllowed,
                "Students cannot update the status field",
            ),
            FieldViolation::BackwardTransition => (
                ErrorCode::WorkStatusInvalid,
                "Work status cannot move backwards",
            ),
        };
        HttpResponse::BadRequest().json(ApiResponse::error_empty(code, msg))
    }
}

/// 检查更新请求中的字段是否符合角色限制
pub(crate) fn check_update_fields(
    actor: &Actor,
    current: WorkStatus,
    update: &UpdateWorkRequest,
) -> Result<(), FieldViolation> {
    match actor.role {
        Role::Mentor if update.has_non_status_keys() => {
            return Err(FieldViolation::MentorNonStatusField);
        }
        Role::Student if update.status.is_some() => {
            return Err(FieldViolation::StudentStatusField);
        }
        Role::Admin | Role::Mentor | Role::Student | Role::School => {}
    }

    match update.next_status() {
        Some(next) if !current.can_transition_to(next) => Err(FieldViolation::BackwardTransition),
        _ => Ok(()),
    }
}

pub async fn update_work(
    service: &WorkService,
    request: &HttpRequest,
    work_id: Uuid,
    mut update_data: UpdateWorkRequest,
) -> ActixResult<HttpResponse> {
    let actor = match require_actor(request) {
        Ok(actor) => actor,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    let work = match storage.get_work_by_id(work_id).await {
        Ok(Some(work)) => work,
        Ok(None) => return Ok(work_not_found()),
        Err(e) => return Ok(internal_error("Failed to get work", e)),
    };

    let facts = match work_facts(&storage, &work).await {
        Ok(facts) => facts,
        Err(e) => return Ok(internal_error("Failed to get work group", e)),
    };

    if !can(&actor, Action::Update, &Resource::Work(facts)) {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::WorkPermissionDenied,
            "You do not have permission to update this work",
        )));
    }

    if let Err(violation) = check_update_fields(&actor, work.status, &update_data) {
        info!(
            "Rejected update of work {} by {}: {:?}",
            work_id, actor.id, violation
        );
        return Ok(violation.into_response());
    }

    // 学生把作品移到其他小组时同样需要是成员
    if let Some(Some(group_id)) = update_data.group_id
        && Some(group_id) != work.group_id
        && !actor.is_admin()
    {
        match storage.is_group_member(group_id, work.user_id).await {
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

    update_data.extra.clear();

    match storage.update_work(work_id, update_data).await {
        Ok(Some(work)) => {
            info!("Work {} updated by {}", work.id, actor.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                work,
                "Work updated successfully",
            )))
        }
        Ok(None) => Ok(work_not_found()),
        Err(e) => Ok(internal_error("Failed to update work", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(value: serde_json::Value) -> UpdateWorkRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_mentor_may_only_touch_status() {
        let mentor = Actor::new(Uuid::new_v4(), Role::Mentor);
        let status_only = update(serde_json::json!({ "status": "reviewed" }));
        assert_eq!(
            check_update_fields(&mentor, WorkStatus::Submitted, &status_only),
            Ok(())
        );

        let with_title = update(serde_json::json!({ "status": "reviewed", "title": "x" }));
        assert_eq!(
            check_update_fields(&mentor, WorkStatus::Submitted, &with_title),
            Err(FieldViolation::MentorNonStatusField)
        );
    }

    #[test]
    fn test_student_cannot_set_status() {
        let student = Actor::new(Uuid::new_v4(), Role::Student);
        let req = update(serde_json::json!({ "status": "submitted" }));
        assert_eq!(
            check_update_fields(&student, WorkStatus::Draft, &req),
            Err(FieldViolation::StudentStatusField)
        );

        let title = update(serde_json::json!({ "title": "New title" }));
        assert_eq!(check_update_fields(&student, WorkStatus::Draft, &title), Ok(()));
    }

    #[test]
    fn test_status_never_moves_backwards() {
        let admin = Actor::new(Uuid::new_v4(), Role::Admin);
        let req = update(serde_json::json!({ "status": "submitted" }));
        assert_eq!(
            check_update_fields(&admin, WorkStatus::Reviewed, &req),
            Err(FieldViolation::BackwardTransition)
        );
    }

    #[test]
    fn test_mentor_null_valued_fields_still_count() {
        let mentor = Actor::new(Uuid::new_v4(), Role::Mentor);
        let req = update(serde_json::json!({
            "status": "reviewed",
            "title": null,
            "group_id": null
        }));
        assert_eq!(
            check_update_fields(&mentor, WorkStatus::Submitted, &req),
            Err(FieldViolation::MentorNonStatusField)
        );
    }

    mod service {
        use super::*;
        use crate::services::works::testing::{body_json, request_as, scene};
        use actix_web::http::StatusCode;
        use crate::storage::Storage;

        async fn send(
            scene: &crate::services::works::testing::Scene,
            user: &crate::models::users::entities::User,
            body: serde_json::Value,
        ) -> HttpResponse {
            let req = request_as(&scene.storage, user);
            update_work(&WorkService::new_lazy(), &req, scene.work.id, update(body))
                .await
                .unwrap()
        }

        #[actix_web::test]
        async fn test_group_mentor_moves_status_forward() {
            let scene = scene(WorkStatus::Submitted).await;
            let resp = send(&scene, &scene.mentor, serde_json::json!({ "status": "reviewed" })).await;
            assert_eq!(resp.status(), StatusCode::OK);
            assert_eq!(body_json(resp).await["data"]["status"], "reviewed");
        }

        #[actix_web::test]
        async fn test_group_mentor_rejected_for_other_fields() {
            let scene = scene(WorkStatus::Submitted).await;

            let resp = send(
                &scene,
                &scene.mentor,
                serde_json::json!({ "status": "reviewed", "title": "Renamed" }),
            )
            .await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

            let resp = send(
                &scene,
                &scene.mentor,
                serde_json::json!({ "status": "reviewed", "title": null, "group_id": null }),
            )
            .await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

            let work = scene.storage.get_work_by_id(scene.work.id).await.unwrap().unwrap();
            assert_eq!(work.status, WorkStatus::Submitted);
            assert!(work.group_id.is_some());
        }

        #[actix_web::test]
        async fn test_unrelated_mentor_forbidden() {
            let scene = scene(WorkStatus::Submitted).await;
            let resp = send(
                &scene,
                &scene.other_mentor,
                serde_json::json!({ "status": "reviewed" }),
            )
            .await;
            assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        }

        #[actix_web::test]
        async fn test_student_locked_out_after_review() {
            let scene = scene(WorkStatus::Reviewed).await;
            let resp = send(&scene, &scene.student, serde_json::json!({ "title": "Late edit" })).await;
            assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        }

        #[actix_web::test]
        async fn test_student_null_clears_optional_field() {
            let scene = scene(WorkStatus::Submitted).await;
            let resp = send(
                &scene,
                &scene.student,
                serde_json::json!({ "title": null, "description": null }),
            )
            .await;
            assert_eq!(resp.status(), StatusCode::OK);

            let json = body_json(resp).await;
            assert_eq!(json["data"]["title"], "Day 1");
            assert!(json["data"]["description"].is_null());
        }

        #[actix_web::test]
        async fn test_admin_cannot_move_status_backwards() {
            let scene = scene(WorkStatus::Reviewed).await;
            let resp = send(&scene, &scene.admin, serde_json::json!({ "status": "draft" })).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        }
    }
}
