use crate::config::AppConfig;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

// 身份服务签发的访问令牌 Claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: String,           // Subject (user ID, UUID)
    #[serde(default)]
    pub email: Option<String>, // 用户邮箱
    pub exp: usize,            // Expiration time (时间戳)
    #[serde(default)]
    pub iat: Option<usize>,    // Issued at (签发时间)
    #[serde(default)]
    pub user_metadata: Option<serde_json::Value>, // 注册时填写的附加信息
}

impl AccessClaims {
    fn metadata_str(&self, key: &str) -> Option<String> {
        self.user_metadata
            .as_ref()
            .and_then(|m| m.get(key))
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }

    /// 注册时自选的角色
    pub fn requested_role(&self) -> Option<String> {
        self.metadata_str("role")
    }

    pub fn display_name(&self) -> Option<String> {
        self.metadata_str("name")
            .or_else(|| self.metadata_str("full_name"))
    }

    pub fn avatar_url(&self) -> Option<String> {
        self.metadata_str("avatar_url")
    }
}

// 签名对象 URL 的用途
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ObjectTokenPurpose {
    Upload,
    Download,
}

// 签名对象 URL 的 Claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectClaims {
    pub purpose: ObjectTokenPurpose,
    pub bucket: String,
    pub path: String,
    pub sub: String, // 申请签名的用户
    pub exp: usize,
    pub iat: usize,
}

pub struct JwtUtils;

impl JwtUtils {
    // 验证访问令牌（使用全局配置）
    pub fn verify_access_token(token: &str) -> Result<AccessClaims, jsonwebtoken::errors::Error> {
        let config = AppConfig::get();
        Self::verify_access_token_with(token, &config.auth.jwt_secret, &config.auth.audience)
    }

    // 验证访问令牌
    pub fn verify_access_token_with(
        token: &str,
        secret: &str,
        audience: &str,
    ) -> Result<AccessClaims, jsonwebtoken::errors::Error> {
        let decoding_key = DecodingKey::from_secret(secret.as_ref());
        let mut validation = Validation::new(Algorithm::HS256);
        if audience.is_empty() {
            validation.validate_aud = false;
        } else {
            validation.set_audience(&[audience]);
        }

        decode::<AccessClaims>(token, &decoding_key, &validation).map(|data| data.claims)
    }

    // 生成签名对象令牌（使用全局配置）
    pub fn sign_object_token(
        purpose: ObjectTokenPurpose,
        bucket: &str,
        path: &str,
        user_id: &str,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let config = AppConfig::get();
        Self::sign_object_token_with(
            config.storage_signing_secret(),
            purpose,
            bucket,
            path,
            user_id,
            chrono::Duration::seconds(config.upload.signed_url_expiry),
        )
    }

    // 生成签名对象令牌
    pub fn sign_object_token_with(
        secret: &str,
        purpose: ObjectTokenPurpose,
        bucket: &str,
        path: &str,
        user_id: &str,
        expiry: chrono::Duration,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = chrono::Utc::now();
        let claims = ObjectClaims {
            purpose,
            bucket: bucket.to_string(),
            path: path.to_string(),
            sub: user_id.to_string(),
            exp: (now + expiry).timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        let encoding_key = EncodingKey::from_secret(secret.as_ref());
        encode(&Header::new(Algorithm::HS256), &claims, &encoding_key)
    }

    // 验证签名对象令牌（使用全局配置）
    pub fn verify_object_token(
        token: &str,
        expected: ObjectTokenPurpose,
    ) -> Result<ObjectClaims, jsonwebtoken::errors::Error> {
        Self::verify_object_token_with(token, AppConfig::get().storage_signing_secret(), expected)
    }

    // 验证签名对象令牌及其用途
    pub fn verify_object_token_with(
        token: &str,
        secret: &str,
        expected: ObjectTokenPurpose,
    ) -> Result<ObjectClaims, jsonwebtoken::errors::Error> {
        let decoding_key = DecodingKey::from_secret(secret.as_ref());
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_aud = false;

        let claims = decode::<ObjectClaims>(token, &decoding_key, &validation)?.claims;
        if claims.purpose != expected {
            return Err(jsonwebtoken::errors::Error::from(
                jsonwebtoken::errors::ErrorKind::InvalidToken,
            ));
        }
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-with-enough-length-000";

    fn access_token(claims: serde_json::Value) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_ref()),
        )
        .unwrap()
    }

    fn exp() -> i64 {
        chrono::Utc::now().timestamp() + 600
    }

    #[test]
    fn test_verify_access_token_reads_metadata() {
        let token = access_token(serde_json::json!({
            "sub": "6f1c1f0e-3c1a-4c55-9a6c-0d6f8c0f4a10",
            "email": "aiko@example.com",
            "aud": "authenticated",
            "exp": exp(),
            "user_metadata": { "role": "school", "full_name": "Aiko" }
        }));

        let claims = JwtUtils::verify_access_token_with(&token, SECRET, "authenticated").unwrap();
        assert_eq!(claims.email.as_deref(), Some("aiko@example.com"));
        assert_eq!(claims.requested_role().as_deref(), Some("school"));
        assert_eq!(claims.display_name().as_deref(), Some("Aiko"));
    }

    #[test]
    fn test_verify_access_token_rejects_wrong_secret_and_audience() {
        let token = access_token(serde_json::json!({
            "sub": "x", "aud": "authenticated", "exp": exp()
        }));
        assert!(JwtUtils::verify_access_token_with(&token, "other-secret", "authenticated").is_err());
        assert!(JwtUtils::verify_access_token_with(&token, SECRET, "service").is_err());
        assert!(JwtUtils::verify_access_token_with(&token, SECRET, "").is_ok());
    }

    #[test]
    fn test_expired_access_token_rejected() {
        let token = access_token(serde_json::json!({
            "sub": "x", "exp": chrono::Utc::now().timestamp() - 3600
        }));
        assert!(JwtUtils::verify_access_token_with(&token, SECRET, "").is_err());
    }

    #[test]
    fn test_object_token_round_trip_and_purpose() {
        let token = JwtUtils::sign_object_token_with(
            SECRET,
            ObjectTokenPurpose::Upload,
            "works",
            "u1/report_1.pdf",
            "u1",
            chrono::Duration::seconds(3600),
        )
        .unwrap();

        let claims =
            JwtUtils::verify_object_token_with(&token, SECRET, ObjectTokenPurpose::Upload).unwrap();
        assert_eq!(claims.bucket, "works");
        assert_eq!(claims.path, "u1/report_1.pdf");

        // 上传令牌不能用于下载
        assert!(
            JwtUtils::verify_object_token_with(&token, SECRET, ObjectTokenPurpose::Download)
                .is_err()
        );
    }
}
