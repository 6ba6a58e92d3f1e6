pub mod create;
pub mod favorites;
pub mod get;
pub mod list;
pub mod manage;
pub mod search;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use std::sync::Arc;
use uuid::Uuid;

use crate::models::{
    ApiResponse, ErrorCode,
    resources::requests::{
        CreateResourceRequest, ResourceListQuery, ResourceSearchQuery, UpdateResourceRequest,
    },
};
use crate::search::{DisabledSuggester, ResourceSuggester};
use crate::storage::Storage;

pub struct ResourceService {
    storage: Option<Arc<dyn Storage>>,
}

pub(crate) fn resource_not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::error_empty(
        ErrorCode::ResourceNotFound,
        "Resource not found",
    ))
}

impl ResourceService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        match &self.storage {
            Some(storage) => storage.clone(),
            None => super::storage_from_request(request),
        }
    }

    // 未注册推荐器时退化为不推荐
    pub(crate) fn get_suggester(&self, request: &HttpRequest) -> Arc<dyn ResourceSuggester> {
        request
            .app_data::<web::Data<Arc<dyn ResourceSuggester>>>()
            .map(|s| s.get_ref().clone())
            .unwrap_or_else(|| Arc::new(DisabledSuggester))
    }

    pub async fn list_resources(
        &self,
        request: &HttpRequest,
        query: ResourceListQuery,
    ) -> ActixResult<HttpResponse> {
        list::list_resources(self, request, query).await
    }

    pub async fn get_resource(
        &self,
        request: &HttpRequest,
        resource_id: Uuid,
    ) -> ActixResult<HttpResponse> {
        get::get_resource(self, request, resource_id).await
    }

    pub async fn create_resource(
        &self,
        request: &HttpRequest,
        resource_data: CreateResourceRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_resource(self, request, resource_data).await
    }

    pub async fn update_resource(
        &self,
        request: &HttpRequest,
        resource_id: Uuid,
        update_data: UpdateResourceRequest,
    ) -> ActixResult<HttpResponse> {
        manage::update_resource(self, request, resource_id, update_data).await
    }

    pub async fn delete_resource(
        &self,
        request: &HttpRequest,
        resource_id: Uuid,
    ) -> ActixResult<HttpResponse> {
        manage::delete_resource(self, request, resource_id).await
    }

    // 收藏（重复收藏返回成功）
    pub async fn add_favorite(
        &self,
        request: &HttpRequest,
        resource_id: Uuid,
    ) -> ActixResult<HttpResponse> {
        favorites::add_favorite(self, request, resource_id).await
    }

    pub async fn remove_favorite(
        &self,
        request: &HttpRequest,
        resource_id: Uuid,
    ) -> ActixResult<HttpResponse> {
        favorites::remove_favorite(self, request, resource_id).await
    }

    pub async fn list_favorites(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        favorites::list_favorites(self, request).await
    }

    // 数据库检索 + AI 推荐
    pub async fn search_resources(
        &self,
        request: &HttpRequest,
        query: ResourceSearchQuery,
    ) -> ActixResult<HttpResponse> {
        search::search_resources(self, request, query).await
    }
}
