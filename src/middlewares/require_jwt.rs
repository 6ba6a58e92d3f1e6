/*!
 * JWT 认证中间件
 *
 * 校验身份服务签发的访问令牌，并为请求建立 [`SessionContext`]。
 *
 * ## 使用方法
 *
 * ```rust,ignore
 * web::scope("/api/v1/works")
 *     .wrap(RequireJWT)
 *     .route("", web::get().to(list_works))
 * ```
 *
 * 处理程序中通过 `RequireJWT::extract_actor(&req)` 或
 * `RequireJWT::extract_session(&req)` 取得当前用户。
 *
 * ## 认证流程
 *
 * 1. 客户端在请求头中包含 `Authorization: Bearer <JWT_TOKEN>`
 * 2. 校验签名、有效期和 audience，从 `sub` 得到用户 ID
 * 3. 先查资料缓存 `profile:<uuid>`，未命中时查数据库
 * 4. 数据库中没有资料时按令牌信息创建（首次登录）
 * 5. 只有读取期间资料未被失效，才把结果写回缓存
 */

use crate::authz::{Actor, SESSIONS, SessionContext};
use crate::cache::{CacheResult, ObjectCache};
use crate::config::AppConfig;
use crate::models::ErrorCode;
use crate::models::users::{
    entities::{User, UserRole},
    requests::ProvisionProfileRequest,
};
use crate::storage::Storage;
use crate::utils::jwt::{AccessClaims, JwtUtils};
use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage, HttpRequest,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::{rc::Rc, sync::Arc};
use tracing::{debug, error, info};
use uuid::Uuid;

use super::create_error_response;

const BEARER_PREFIX: &str = "Bearer ";
const AUTHORIZATION_HEADER: &str = "Authorization";

#[derive(Clone)]
pub struct RequireJWT;

/// 认证失败的原因
#[derive(Debug, PartialEq)]
pub(crate) enum AuthFailure {
    Unauthorized(String),
    Internal(String),
}

/// 资料缓存键
pub fn profile_cache_key(user_id: Uuid) -> String {
    format!("profile:{user_id}")
}

/// 资料变更后调用：推进代次并清除缓存
pub async fn invalidate_profile(cache: &Arc<dyn ObjectCache>, user_id: Uuid) {
    let generation = SESSIONS.invalidate(user_id);
    cache.remove(&profile_cache_key(user_id)).await;
    debug!("Profile cache invalidated for {} (generation {})", user_id, generation);
}

/// 首次登录时根据令牌生成资料
///
/// 自选角色只接受 student / international_student / school，
/// 配置的管理员邮箱直接授予 admin。
pub(crate) fn provision_request_from_claims(
    user_id: Uuid,
    claims: &AccessClaims,
    admin_email: &str,
) -> ProvisionProfileRequest {
    let email = claims.email.clone().unwrap_or_default();

    let role = if !admin_email.is_empty() && email.eq_ignore_ascii_case(admin_email) {
        UserRole::Admin
    } else {
        claims
            .requested_role()
            .and_then(|r| r.parse::<UserRole>().ok())
            .filter(UserRole::is_self_selectable)
            .unwrap_or(UserRole::Student)
    };

    ProvisionProfileRequest {
        id: user_id,
        email,
        name: claims.display_name(),
        avatar_url: claims.avatar_url(),
        role,
    }
}

/// 根据已验证的令牌建立会话
pub(crate) async fn resolve_session(
    storage: &Arc<dyn Storage>,
    cache: &Arc<dyn ObjectCache>,
    claims: &AccessClaims,
    admin_email: &str,
    ttl: u64,
) -> Result<SessionContext, AuthFailure> {
    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| AuthFailure::Unauthorized("Invalid user ID in token".to_string()))?;

    // 先记下代次，读取期间发生的失效会使它过期
    let generation = SESSIONS.current(user_id);
    let cache_key = profile_cache_key(user_id);

    if let CacheResult::Found(user) = cache.get_json::<User>(&cache_key).await {
        return Ok(SessionContext::new(user, generation));
    }

    let user = match storage.get_user_by_id(user_id).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            let request = provision_request_from_claims(user_id, claims, admin_email);
            info!(
                "Provisioning profile for {} with role {}",
                user_id, request.role
            );
            storage.provision_user(request).await.map_err(|e| {
                error!("Failed to provision profile for {}: {}", user_id, e);
                AuthFailure::Internal(format!("Failed to provision profile: {e}"))
            })?
        }
        Err(e) => {
            error!("Failed to load profile for {}: {}", user_id, e);
            return Err(AuthFailure::Internal(format!("Failed to load profile: {e}")));
        }
    };

    if SESSIONS.is_current(user_id, generation) {
        cache.insert_json(cache_key.clone(), &user, ttl).await;
        // 写入期间发生了失效，撤回刚写入的旧资料
        if !SESSIONS.is_current(user_id, generation) {
            cache.remove(&cache_key).await;
            debug!("Withdrew stale profile write-back for {}", user_id);
        }
    } else {
        debug!("Skipping stale profile write-back for {}", user_id);
    }

    Ok(SessionContext::new(user, generation))
}

// 辅助函数：提取并验证 JWT access token
async fn extract_and_validate_jwt(req: &ServiceRequest) -> Result<SessionContext, AuthFailure> {
    let token = req
        .headers()
        .get(AUTHORIZATION_HEADER)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix(BEARER_PREFIX))
        .ok_or_else(|| {
            AuthFailure::Unauthorized("Missing or invalid Authorization header".to_string())
        })?;

    let claims = JwtUtils::verify_access_token(token).map_err(|err| {
        info!("JWT token validation failed: {}", err);
        AuthFailure::Unauthorized("Invalid JWT token".to_string())
    })?;

    let storage = req
        .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
        .ok_or_else(|| AuthFailure::Internal("Storage not found in app data".to_string()))?
        .get_ref()
        .clone();

    let cache = req
        .app_data::<actix_web::web::Data<Arc<dyn ObjectCache>>>()
        .ok_or_else(|| AuthFailure::Internal("Cache not found in app data".to_string()))?
        .get_ref()
        .clone();

    let config = AppConfig::get();
    resolve_session(
        &storage,
        &cache,
        &claims,
        &config.auth.admin_email,
        config.cache.default_ttl,
    )
    .await
}

impl<S, B> Transform<S, ServiceRequest> for RequireJWT
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireJWTMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireJWTMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct RequireJWTMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequireJWTMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        Box::pin(async move {
            // 处理 OPTIONS 请求
            if req.method() == actix_web::http::Method::OPTIONS {
                return Ok(req.into_response(
                    create_error_response(StatusCode::NO_CONTENT, ErrorCode::Success, "")
                        .map_into_right_body(),
                ));
            }

            match extract_and_validate_jwt(&req).await {
                Ok(session) => {
                    debug!(
                        "JWT authentication successful for ID: {} ({:?})",
                        session.user.id, session.actor.role
                    );
                    req.extensions_mut().insert(session);
                    let res = srv.call(req).await?.map_into_left_body();
                    Ok(res)
                }
                Err(AuthFailure::Unauthorized(err)) => {
                    info!(
                        "JWT authentication failed for request to {}: {}",
                        req.path(),
                        err
                    );
                    Ok(req.into_response(
                        create_error_response(
                            StatusCode::UNAUTHORIZED,
                            ErrorCode::Unauthorized,
                            &format!("Unauthorized: {err}"),
                        )
                        .map_into_right_body(),
                    ))
                }
                Err(AuthFailure::Internal(err)) => Ok(req.into_response(
                    create_error_response(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ErrorCode::ProfileProvisionFailed,
                        &err,
                    )
                    .map_into_right_body(),
                )),
            }
        })
    }
}

// 辅助函数：从请求中提取会话信息
impl RequireJWT {
    /// 从请求扩展中提取会话
    /// 此函数应该在应用了RequireJWT中间件的路由处理程序中使用
    pub fn extract_session(req: &HttpRequest) -> Option<SessionContext> {
        req.extensions().get::<SessionContext>().cloned()
    }

    /// 提取权限判定用的 Actor
    pub fn extract_actor(req: &HttpRequest) -> Option<Actor> {
        req.extensions().get::<SessionContext>().map(|s| s.actor)
    }

    /// 提取当前用户资料
    pub fn extract_user(req: &HttpRequest) -> Option<User> {
        req.extensions()
            .get::<SessionContext>()
            .map(|s| s.user.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authz::Role;
    use crate::cache::object_cache::moka::MokaCacheWrapper;
    use crate::storage::sea_orm_storage::SeaOrmStorage;

    fn claims(sub: Uuid, email: &str, role: Option<&str>) -> AccessClaims {
        AccessClaims {
            sub: sub.to_string(),
            email: Some(email.to_string()),
            exp: usize::MAX,
            iat: None,
            user_metadata: role.map(|r| serde_json::json!({ "role": r, "name": "Kenji" })),
        }
    }

    async fn fixtures() -> (Arc<dyn Storage>, Arc<dyn ObjectCache>) {
        let storage: Arc<dyn Storage> = Arc::new(SeaOrmStorage::in_memory().await);
        let cache: Arc<dyn ObjectCache> = Arc::new(MokaCacheWrapper::with_capacity(100, 60));
        (storage, cache)
    }

    #[test]
    fn test_self_selected_role_is_restricted() {
        let id = Uuid::new_v4();
        let school = provision_request_from_claims(id, &claims(id, "s@x.jp", Some("school")), "");
        assert_eq!(school.role, UserRole::School);
        assert_eq!(school.name.as_deref(), Some("Kenji"));

        let admin = provision_request_from_claims(id, &claims(id, "s@x.jp", Some("admin")), "");
        assert_eq!(admin.role, UserRole::Student);

        let mentor = provision_request_from_claims(id, &claims(id, "s@x.jp", Some("mentor")), "");
        assert_eq!(mentor.role, UserRole::Student);

        let none = provision_request_from_claims(id, &claims(id, "s@x.jp", None), "");
        assert_eq!(none.role, UserRole::Student);
    }

    #[test]
    fn test_bootstrap_admin_email() {
        let id = Uuid::new_v4();
        let req = provision_request_from_claims(
            id,
            &claims(id, "Boss@Example.com", Some("student")),
            "boss@example.com",
        );
        assert_eq!(req.role, UserRole::Admin);
    }

    #[tokio::test]
    async fn test_first_login_provisions_and_caches_profile() {
        let (storage, cache) = fixtures().await;
        let id = Uuid::new_v4();

        let session = resolve_session(&storage, &cache, &claims(id, "a@x.jp", None), "", 60)
            .await
            .unwrap();
        assert_eq!(session.actor.role, Role::Student);
        assert!(storage.get_user_by_id(id).await.unwrap().is_some());
        assert!(matches!(
            cache.get_json::<User>(&profile_cache_key(id)).await,
            CacheResult::Found(_)
        ));
    }

    #[tokio::test]
    async fn test_invalidation_drops_cached_profile() {
        let (storage, cache) = fixtures().await;
        let id = Uuid::new_v4();
        let c = claims(id, "b@x.jp", Some("international_student"));

        let first = resolve_session(&storage, &cache, &c, "", 60).await.unwrap();
        assert_eq!(first.actor.role, Role::Mentor);

        invalidate_profile(&cache, id).await;
        assert!(matches!(
            cache.get_json::<User>(&profile_cache_key(id)).await,
            CacheResult::NotFound
        ));

        let second = resolve_session(&storage, &cache, &c, "", 60).await.unwrap();
        assert!(second.generation > first.generation);
    }

    /// 写入缓存的同时发生失效
    struct InvalidatingCache {
        inner: MokaCacheWrapper,
        user_id: Uuid,
    }

    #[async_trait::async_trait]
    impl ObjectCache for InvalidatingCache {
        async fn get_raw(&self, key: &str) -> CacheResult<String> {
            self.inner.get_raw(key).await
        }

        async fn insert_raw(&self, key: String, value: String, ttl: u64) {
            SESSIONS.invalidate(self.user_id);
            self.inner.insert_raw(key, value, ttl).await;
        }

        async fn remove(&self, key: &str) {
            self.inner.remove(key).await;
        }

        async fn invalidate_all(&self) {
            self.inner.invalidate_all().await;
        }
    }

    #[tokio::test]
    async fn test_invalidation_during_write_back_is_withdrawn() {
        let (storage, _) = fixtures().await;
        let id = Uuid::new_v4();
        let cache: Arc<dyn ObjectCache> = Arc::new(InvalidatingCache {
            inner: MokaCacheWrapper::with_capacity(100, 60),
            user_id: id,
        });

        let session = resolve_session(&storage, &cache, &claims(id, "d@x.jp", None), "", 60)
            .await
            .unwrap();
        assert!(!SESSIONS.is_current(id, session.generation));
        assert!(matches!(
            cache.get_json::<User>(&profile_cache_key(id)).await,
            CacheResult::NotFound
        ));
    }

    #[tokio::test]
    async fn test_invalid_subject_is_unauthorized() {
        let (storage, cache) = fixtures().await;
        let mut c = claims(Uuid::new_v4(), "c@x.jp", None);
        c.sub = "42".into();

        let err = resolve_session(&storage, &cache, &c, "", 60).await.unwrap_err();
        assert!(matches!(err, AuthFailure::Unauthorized(_)));
    }
}
