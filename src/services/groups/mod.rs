pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod members;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;
use uuid::Uuid;

use crate::authz::{Actor, GroupFacts, Role};
use crate::errors::Result;
use crate::models::groups::{
    entities::Group,
    requests::{AddMemberRequest, CreateGroupRequest, UpdateGroupRequest},
};
use crate::storage::Storage;

pub struct GroupService {
    storage: Option<Arc<dyn Storage>>,
}

/// 读取判断小组权限所需的事实
///
/// 只有学生需要查询成员关系。
pub(crate) async fn group_facts(
    storage: &Arc<dyn Storage>,
    group: &Group,
    actor: &Actor,
) -> Result<GroupFacts> {
    let actor_is_member = match actor.role {
        Role::Student => storage.is_group_member(group.id, actor.id).await?,
        Role::Admin | Role::Mentor | Role::School => false,
    };
    Ok(GroupFacts {
        mentor_id: group.mentor_id,
        actor_is_member,
    })
}

impl GroupService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        match &self.storage {
            Some(storage) => storage.clone(),
            None => super::storage_from_request(request),
        }
    }

    // 获取小组列表（按角色限定范围）
    pub async fn list_groups(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        list::list_groups(self, request).await
    }

    // 获取小组详情（含导师和成员）
    pub async fn get_group(&self, request: &HttpRequest, group_id: Uuid) -> ActixResult<HttpResponse> {
        get::get_group(self, request, group_id).await
    }

    pub async fn create_group(
        &self,
        request: &HttpRequest,
        group_data: CreateGroupRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_group(self, request, group_data).await
    }

    pub async fn update_group(
        &self,
        request: &HttpRequest,
        group_id: Uuid,
        update_data: UpdateGroupRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_group(self, request, group_id, update_data).await
    }

    pub async fn delete_group(
        &self,
        request: &HttpRequest,
        group_id: Uuid,
    ) -> ActixResult<HttpResponse> {
        delete::delete_group(self, request, group_id).await
    }

    // 添加小组成员
    pub async fn add_member(
        &self,
        request: &HttpRequest,
        group_id: Uuid,
        member_data: AddMemberRequest,
    ) -> ActixResult<HttpResponse> {
        members::add_member(self, request, group_id, member_data).await
    }

    // 移除小组成员
    pub async fn remove_member(
        &self,
        request: &HttpRequest,
        group_id: Uuid,
        student_id: Uuid,
    ) -> ActixResult<HttpResponse> {
        members::remove_member(self, request, group_id, student_id).await
    }
}
