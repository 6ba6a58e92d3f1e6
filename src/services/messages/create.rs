use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{MessageService, group_id_required, load_group_facts};
use crate::authz::{Action, Resource, can};
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, ErrorCode,
    messages::{requests::CreateMessageRequest, responses::MessageWithSender},
};
use crate::services::{internal_error, require_actor};

pub async fn create_message(
    service: &MessageService,
    request: &HttpRequest,
    message_data: CreateMessageRequest,
) -> ActixResult<HttpResponse> {
    let actor = match require_actor(request) {
        Ok(actor) => actor,
        Err(resp) => return Ok(resp),
    };

    let Some(group_id) = message_data.group_id else {
        return Ok(group_id_required());
    };

    if !message_data.has_payload() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::MessageContentRequired,
            "Message content or file is required",
        )));
    }

    let storage = service.get_storage(request);
    let facts = match load_group_facts(&storage, group_id, &actor).await {
        Ok(facts) => facts,
        Err(resp) => return Ok(resp),
    };

    let resource = Resource::Message {
        group: facts,
        sender_id: Some(actor.id),
    };
    if !can(&actor, Action::Create, &resource) {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::MessagePermissionDenied,
            "You cannot post messages to this group",
        )));
    }

    let message = match storage
        .create_message(actor.id, group_id, message_data)
        .await
    {
        Ok(message) => message,
        Err(e) => return Ok(internal_error("Failed to send message", e)),
    };

    info!(
        "Message {} posted to group {} by {}",
        message.id, group_id, actor.id
    );

    // 发送者就是当前会话用户，写入后不再查库
    let sender = RequireJWT::extract_user(request);

    Ok(HttpResponse::Created().json(ApiResponse::success(
        MessageWithSender { message, sender },
        "Message sent successfully",
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::works::entities::WorkStatus;
    use crate::services::works::testing::{body_json, request_as, scene};
    use actix_web::http::StatusCode;

    #[actix_web::test]
    async fn test_member_message_carries_session_sender() {
        let scene = scene(WorkStatus::Submitted).await;
        let req = request_as(&scene.storage, &scene.student);
        let resp = create_message(
            &MessageService::new_lazy(),
            &req,
            CreateMessageRequest {
                group_id: scene.work.group_id,
                content: Some("Arrived in Tsuchiura".into()),
                message_type: None,
                file_url: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);

        let json = body_json(resp).await;
        assert_eq!(json["data"]["content"], "Arrived in Tsuchiura");
        assert_eq!(json["data"]["sender"]["id"], scene.student.id.to_string());
    }

    #[actix_web::test]
    async fn test_outsider_cannot_post() {
        let scene = scene(WorkStatus::Submitted).await;
        let req = request_as(&scene.storage, &scene.other_mentor);
        let resp = create_message(
            &MessageService::new_lazy(),
            &req,
            CreateMessageRequest {
                group_id: scene.work.group_id,
                content: Some("Hello".into()),
                message_type: None,
                file_url: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }
}
