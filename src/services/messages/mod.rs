pub mod create;
pub mod delete;
pub mod list;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;
use uuid::Uuid;

use crate::authz::{Actor, GroupFacts};
use crate::models::{
    ApiResponse, ErrorCode,
    messages::requests::{CreateMessageRequest, MessageListQuery},
};
use crate::services::{groups::group_facts, internal_error};
use crate::storage::Storage;

pub struct MessageService {
    storage: Option<Arc<dyn Storage>>,
}

/// 查找小组并计算 actor 的小组事实，小组不存在时返回 404 响应
pub(crate) async fn load_group_facts(
    storage: &Arc<dyn Storage>,
    group_id: Uuid,
    actor: &Actor,
) -> Result<GroupFacts, HttpResponse> {
    let group = match storage.get_group_by_id(group_id).await {
        Ok(Some(group)) => group,
        Ok(None) => {
            return Err(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::GroupNotFound,
                "Group not found",
            )));
        }
        Err(e) => return Err(internal_error("Failed to get group information", e)),
    };

    group_facts(storage, &group, actor)
        .await
        .map_err(|e| internal_error("Failed to check group membership", e))
}

pub(crate) fn group_id_required() -> HttpResponse {
    HttpResponse::BadRequest().json(ApiResponse::error_empty(
        ErrorCode::BadRequest,
        "group_id is required",
    ))
}

impl MessageService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        match &self.storage {
            Some(storage) => storage.clone(),
            None => super::storage_from_request(request),
        }
    }

    // 获取小组消息（按时间倒序，含发送者）
    pub async fn list_messages(
        &self,
        request: &HttpRequest,
        query: MessageListQuery,
    ) -> ActixResult<HttpResponse> {
        list::list_messages(self, request, query).await
    }

    pub async fn create_message(
        &self,
        request: &HttpRequest,
        message_data: CreateMessageRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_message(self, request, message_data).await
    }

    pub async fn delete_message(
        &self,
        request: &HttpRequest,
        message_id: Uuid,
    ) -> ActixResult<HttpResponse> {
        delete::delete_message(self, request, message_id).await
    }
}
