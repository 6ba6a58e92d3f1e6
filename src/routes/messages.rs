use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::messages::requests::{CreateMessageRequest, MessageListQuery};
use crate::services::MessageService;
use crate::utils::SafeMessageId;

// 懒加载的全局 MessageService 实例
static MESSAGE_SERVICE: Lazy<MessageService> = Lazy::new(MessageService::new_lazy);

pub async fn list_messages(
    req: HttpRequest,
    query: web::Query<MessageListQuery>,
) -> ActixResult<HttpResponse> {
    MESSAGE_SERVICE.list_messages(&req, query.into_inner()).await
}

pub async fn create_message(
    req: HttpRequest,
    message_data: web::Json<CreateMessageRequest>,
) -> ActixResult<HttpResponse> {
    MESSAGE_SERVICE
        .create_message(&req, message_data.into_inner())
        .await
}

pub async fn delete_message(
    req: HttpRequest,
    message_id: SafeMessageId,
) -> ActixResult<HttpResponse> {
    MESSAGE_SERVICE.delete_message(&req, message_id.0).await
}

// 配置路由
pub fn configure_messages_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/messages")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    .route(web::get().to(list_messages))
                    .route(web::post().to(create_message)),
            )
            .route("/{message_id}", web::delete().to(delete_message)),
    );
}
