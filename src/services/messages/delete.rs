use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;
use uuid::Uuid;

use super::MessageService;
use crate::authz::{Action, GroupFacts, Resource, can};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{internal_error, require_actor};

pub async fn delete_message(
    service: &MessageService,
    request: &HttpRequest,
    message_id: Uuid,
) -> ActixResult<HttpResponse> {
    let actor = match require_actor(request) {
        Ok(actor) => actor,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    let message = match storage.get_message_by_id(message_id).await {
        Ok(Some(message)) => message,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::MessageNotFound,
                "Message not found",
            )));
        }
        Err(e) => return Ok(internal_error("Failed to get message", e)),
    };

    // 删除只看发送者，不需要小组事实
    let resource = Resource::Message {
        group: GroupFacts::default(),
        sender_id: Some(message.sender_id),
    };
    if !can(&actor, Action::Delete, &resource) {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::MessagePermissionDenied,
            "Only the sender or an admin can delete this message",
        )));
    }

    match storage.delete_message(message_id).await {
        Ok(true) => {
            info!("Message {} deleted by {}", message_id, actor.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Message deleted successfully")))
        }
        Ok(false) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::MessageNotFound,
            "Message not found",
        ))),
        Err(e) => Ok(internal_error("Failed to delete message", e)),
    }
}
