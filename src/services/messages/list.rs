use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::collections::HashMap;

use super::{MessageService, group_id_required, load_group_facts};
use crate::authz::{Action, Resource, can};
use crate::models::{
    ApiResponse, ErrorCode,
    messages::{
        requests::MessageListQuery,
        responses::{MessageListResponse, MessageWithSender},
    },
};
use crate::services::{internal_error, require_actor};

pub async fn list_messages(
    service: &MessageService,
    request: &HttpRequest,
    query: MessageListQuery,
) -> ActixResult<HttpResponse> {
    let actor = match require_actor(request) {
        Ok(actor) => actor,
        Err(resp) => return Ok(resp),
    };

    let Some(group_id) = query.group_id else {
        return Ok(group_id_required());
    };

    let storage = service.get_storage(request);
    let facts = match load_group_facts(&storage, group_id, &actor).await {
        Ok(facts) => facts,
        Err(resp) => return Ok(resp),
    };

    let resource = Resource::Message {
        group: facts,
        sender_id: None,
    };
    if !can(&actor, Action::Read, &resource) {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::MessagePermissionDenied,
            "You do not have access to this group's messages",
        )));
    }

    let (messages, total) = match storage
        .list_messages(group_id, query.limit(), query.offset())
        .await
    {
        Ok(result) => result,
        Err(e) => return Ok(internal_error("Failed to list messages", e)),
    };

    let mut sender_ids: Vec<_> = messages.iter().map(|m| m.sender_id).collect();
    sender_ids.sort_unstable();
    sender_ids.dedup();

    let senders: HashMap<_, _> = match storage.get_users_by_ids(&sender_ids).await {
        Ok(users) => users.into_iter().map(|u| (u.id, u)).collect(),
        Err(e) => return Ok(internal_error("Failed to load message senders", e)),
    };

    let messages = messages
        .into_iter()
        .map(|message| MessageWithSender {
            sender: senders.get(&message.sender_id).cloned(),
            message,
        })
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        MessageListResponse {
            messages,
            total,
            group_id,
        },
        "Messages retrieved successfully",
    )))
}
