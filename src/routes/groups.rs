use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::authz::Role;
use crate::middlewares;
use crate::models::groups::requests::{AddMemberRequest, CreateGroupRequest, UpdateGroupRequest};
use crate::models::messages::requests::{CreateMessageRequest, MessageListQuery};
use crate::services::{GroupService, MessageService};
use crate::utils::{SafeGroupId, SafeStudentId};

// 懒加载的全局 GroupService 实例
static GROUP_SERVICE: Lazy<GroupService> = Lazy::new(GroupService::new_lazy);
static MESSAGE_SERVICE: Lazy<MessageService> = Lazy::new(MessageService::new_lazy);

pub async fn list_groups(req: HttpRequest) -> ActixResult<HttpResponse> {
    GROUP_SERVICE.list_groups(&req).await
}

pub async fn create_group(
    req: HttpRequest,
    group_data: web::Json<CreateGroupRequest>,
) -> ActixResult<HttpResponse> {
    GROUP_SERVICE
        .create_group(&req, group_data.into_inner())
        .await
}

pub async fn get_group(req: HttpRequest, group_id: SafeGroupId) -> ActixResult<HttpResponse> {
    GROUP_SERVICE.get_group(&req, group_id.0).await
}

pub async fn update_group(
    req: HttpRequest,
    group_id: SafeGroupId,
    update_data: web::Json<UpdateGroupRequest>,
) -> ActixResult<HttpResponse> {
    GROUP_SERVICE
        .update_group(&req, group_id.0, update_data.into_inner())
        .await
}

pub async fn delete_group(req: HttpRequest, group_id: SafeGroupId) -> ActixResult<HttpResponse> {
    GROUP_SERVICE.delete_group(&req, group_id.0).await
}

pub async fn add_member(
    req: HttpRequest,
    group_id: SafeGroupId,
    member_data: web::Json<AddMemberRequest>,
) -> ActixResult<HttpResponse> {
    GROUP_SERVICE
        .add_member(&req, group_id.0, member_data.into_inner())
        .await
}

pub async fn remove_member(
    req: HttpRequest,
    group_id: SafeGroupId,
    student_id: SafeStudentId,
) -> ActixResult<HttpResponse> {
    GROUP_SERVICE
        .remove_member(&req, group_id.0, student_id.0)
        .await
}

// 小组下的消息，group_id 取自路径
pub async fn list_group_messages(
    req: HttpRequest,
    group_id: SafeGroupId,
    query: web::Query<MessageListQuery>,
) -> ActixResult<HttpResponse> {
    let mut query = query.into_inner();
    query.group_id = Some(group_id.0);
    MESSAGE_SERVICE.list_messages(&req, query).await
}

pub async fn create_group_message(
    req: HttpRequest,
    group_id: SafeGroupId,
    message_data: web::Json<CreateMessageRequest>,
) -> ActixResult<HttpResponse> {
    let mut message_data = message_data.into_inner();
    message_data.group_id = Some(group_id.0);
    MESSAGE_SERVICE.create_message(&req, message_data).await
}

// 配置路由
pub fn configure_groups_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/groups")
            .wrap(middlewares::RequireJWT)
            .service(
                // 列表按角色限定范围，创建仅管理员
                web::resource("").route(web::get().to(list_groups)).route(
                    web::post()
                        .to(create_group)
                        .wrap(middlewares::RequireRole::new(Role::Admin)),
                ),
            )
            .service(
                web::resource("/{group_id}")
                    .route(web::get().to(get_group))
                    .route(
                        web::put()
                            .to(update_group)
                            .wrap(middlewares::RequireRole::new(Role::Admin)),
                    )
                    .route(
                        web::delete()
                            .to(delete_group)
                            .wrap(middlewares::RequireRole::new(Role::Admin)),
                    ),
            )
            .service(
                web::resource("/{group_id}/members").route(
                    web::post()
                        .to(add_member)
                        .wrap(middlewares::RequireRole::new(Role::Admin)),
                ),
            )
            .service(
                web::resource("/{group_id}/members/{student_id}").route(
                    web::delete()
                        .to(remove_member)
                        .wrap(middlewares::RequireRole::new(Role::Admin)),
                ),
            )
            .service(
                web::resource("/{group_id}/messages")
                    .route(web::get().to(list_group_messages))
                    .route(web::post().to(create_group_message)),
            ),
    );
}
