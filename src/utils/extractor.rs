//! 路径参数提取器
//!
//! 路由中的 ID 段必须是合法的 UUID，否则直接返回 400。

use actix_web::{
    FromRequest, HttpRequest, HttpResponse, dev::Payload, error::InternalError,
};
use futures_util::future::{Ready, ready};
use uuid::Uuid;

use crate::models::{ApiResponse, ErrorCode};

fn parse_uuid_param(req: &HttpRequest, name: &'static str) -> Result<Uuid, actix_web::Error> {
    let raw = req.match_info().get(name).unwrap_or_default();

    Uuid::parse_str(raw).map_err(|_| {
        let message = format!("Invalid {name}: must be a UUID");
        let response = HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::BadRequest, message.clone()));
        InternalError::from_response(message, response).into()
    })
}

macro_rules! define_safe_uuid_extractors {
    ($($name:ident => $param:literal),* $(,)?) => {
        $(
            #[derive(Debug, Clone, Copy, PartialEq, Eq)]
            pub struct $name(pub Uuid);

            impl FromRequest for $name {
                type Error = actix_web::Error;
                type Future = Ready<Result<Self, Self::Error>>;

                fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
                    ready(parse_uuid_param(req, $param).map($name))
                }
            }
        )*
    };
}

define_safe_uuid_extractors! {
    SafeGroupId => "group_id",
    SafeStudentId => "student_id",
    SafeWorkId => "work_id",
    SafeResourceId => "resource_id",
    SafeMessageId => "message_id",
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[actix_web::test]
    async fn test_valid_uuid_segment() {
        let id = Uuid::new_v4();
        let req = TestRequest::default()
            .param("work_id", id.to_string())
            .to_http_request();

        let extracted = SafeWorkId::extract(&req).await.unwrap();
        assert_eq!(extracted.0, id);
    }

    #[actix_web::test]
    async fn test_invalid_uuid_segment_is_bad_request() {
        let req = TestRequest::default()
            .param("group_id", "42")
            .to_http_request();

        let err = SafeGroupId::extract(&req).await.unwrap_err();
        assert_eq!(
            err.as_response_error().status_code(),
            actix_web::http::StatusCode::BAD_REQUEST
        );
    }
}
