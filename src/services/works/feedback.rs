use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;
use uuid::Uuid;

use super::{WorkService, work_facts, work_not_found};
use crate::authz::{Action, Resource, can};
use crate::models::{ApiResponse, ErrorCode, works::requests::CreateFeedbackRequest};
use crate::services::{internal_error, require_actor};

pub async fn create_feedback(
    service: &WorkService,
    request: &HttpRequest,
    work_id: Uuid,
    feedback_data: CreateFeedbackRequest,
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

    if !can(&actor, Action::Review, &Resource::Work(facts)) {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::WorkPermissionDenied,
            "Only admins or the group mentor can give feedback",
        )));
    }

    let comment = match feedback_data.comment.as_deref().map(str::trim) {
        Some(comment) if !comment.is_empty() => comment.to_string(),
        _ => {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::FeedbackCommentRequired,
                "Feedback comment is required",
            )));
        }
    };

    if !feedback_data.rating_is_valid() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::FeedbackRatingInvalid,
            "Feedback rating must be between 1 and 5",
        )));
    }

    match storage
        .create_feedback(work_id, actor.id, comment, feedback_data.rating)
        .await
    {
        Ok(feedback) => {
            info!("Feedback {} added to work {} by {}", feedback.id, work_id, actor.id);
            Ok(HttpResponse::Created().json(ApiResponse::success(
                feedback,
                "Feedback submitted successfully",
            )))
        }
        Err(e) => Ok(internal_error("Failed to submit feedback", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::works::entities::WorkStatus;
    use crate::services::works::testing::{body_json, request_as, scene};
    use actix_web::http::StatusCode;
    use crate::storage::Storage;

    fn feedback(comment: &str, rating: Option<i32>) -> CreateFeedbackRequest {
        CreateFeedbackRequest {
            comment: Some(comment.into()),
            rating,
        }
    }

    #[actix_web::test]
    async fn test_group_mentor_feedback_marks_reviewed() {
        let scene = scene(WorkStatus::Submitted).await;
        let req = request_as(&scene.storage, &scene.mentor);
        let resp = create_feedback(
            &WorkService::new_lazy(),
            &req,
            scene.work.id,
            feedback("Great detail", Some(5)),
        )
        .await
        .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        assert_eq!(body_json(resp).await["data"]["rating"], 5);

        let work = scene.storage.get_work_by_id(scene.work.id).await.unwrap().unwrap();
        assert_eq!(work.status, WorkStatus::Reviewed);
    }

    #[actix_web::test]
    async fn test_unrelated_mentor_cannot_give_feedback() {
        let scene = scene(WorkStatus::Submitted).await;
        let req = request_as(&scene.storage, &scene.other_mentor);
        let resp = create_feedback(
            &WorkService::new_lazy(),
            &req,
            scene.work.id,
            feedback("Nice", None),
        )
        .await
        .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn test_rating_outside_range_rejected() {
        let scene = scene(WorkStatus::Submitted).await;
        for rating in [0, 6, -7, 9999] {
            let req = request_as(&scene.storage, &scene.admin);
            let resp = create_feedback(
                &WorkService::new_lazy(),
                &req,
                scene.work.id,
                feedback("Nice", Some(rating)),
            )
            .await
            .unwrap();
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        }

        let work = scene.storage.get_work_by_id(scene.work.id).await.unwrap().unwrap();
        assert_eq!(work.status, WorkStatus::Submitted);
    }
}
