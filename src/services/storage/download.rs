use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::header};
use tracing::warn;

use super::{
    StorageService, access_denied, invalid_path, object_not_found, parse_bucket, signed_url,
};
use crate::authz::{ObjectOp, can_access_object};
use crate::config::AppConfig;
use crate::models::{ApiResponse, ErrorCode, objects::responses::DownloadUrlResponse};
use crate::services::{internal_error, require_actor};
use crate::utils::jwt::{JwtUtils, ObjectTokenPurpose};
use crate::utils::validate::validate_object_path;

pub async fn create_download_url(
    request: &HttpRequest,
    bucket: &str,
    path: &str,
) -> ActixResult<HttpResponse> {
    let actor = match require_actor(request) {
        Ok(actor) => actor,
        Err(resp) => return Ok(resp),
    };

    let bucket = match parse_bucket(bucket) {
        Ok(bucket) => bucket,
        Err(resp) => return Ok(resp),
    };

    if let Err(msg) = validate_object_path(path) {
        return Ok(invalid_path(msg));
    }

    if !can_access_object(&actor, ObjectOp::Download, bucket.as_str(), path) {
        return Ok(access_denied(bucket));
    }

    let token = match JwtUtils::sign_object_token(
        ObjectTokenPurpose::Download,
        bucket.as_str(),
        path,
        &actor.id.to_string(),
    ) {
        Ok(token) => token,
        Err(e) => return Ok(internal_error("Failed to sign download URL", e)),
    };

    let config = AppConfig::get();
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        DownloadUrlResponse {
            download_url: signed_url(&config.upload.public_base_url, "download", &token),
            expires_in: config.upload.signed_url_expiry,
        },
        "Download URL created successfully",
    )))
}

pub async fn download_object(
    service: &StorageService,
    request: &HttpRequest,
    token: &str,
) -> ActixResult<HttpResponse> {
    let claims = match JwtUtils::verify_object_token(token, ObjectTokenPurpose::Download) {
        Ok(claims) => claims,
        Err(e) => {
            warn!("Rejected download token: {}", e);
            return Ok(HttpResponse::Unauthorized().json(ApiResponse::error_empty(
                ErrorCode::SignedUrlInvalid,
                "Invalid or expired download URL",
            )));
        }
    };

    let store = service.get_object_store(request);
    let data = match store.get(&claims.bucket, &claims.path).await {
        Ok(Some(data)) => data,
        Ok(None) => return Ok(object_not_found()),
        Err(e) => return Ok(internal_error("Failed to read object", e)),
    };

    let file_name = claims.path.rsplit('/').next().unwrap_or(&claims.path);
    Ok(HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, "application/octet-stream"))
        .insert_header(attachment(file_name))
        .body(data))
}

/// 下载附件头，文件名中的引号等字符由 actix 转义，非 ASCII 名称另附 `filename*`
fn attachment(file_name: &str) -> header::ContentDisposition {
    let mut parameters = vec![header::DispositionParam::Filename(file_name.to_string())];
    if !file_name.is_ascii() {
        parameters.push(header::DispositionParam::FilenameExt(header::ExtendedValue {
            charset: header::Charset::Ext("UTF-8".to_string()),
            language_tag: None,
            value: file_name.as_bytes().to_vec(),
        }));
    }
    header::ContentDisposition {
        disposition: header::DispositionType::Attachment,
        parameters,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attachment_escapes_quotes() {
        let value = attachment(r#"day"1.pdf"#).to_string();
        assert_eq!(value, r#"attachment; filename="day\"1.pdf""#);
        assert_eq!(
            attachment(r#"day"1.pdf"#).get_filename(),
            Some(r#"day"1.pdf"#)
        );
    }

    #[test]
    fn test_attachment_keeps_plain_names() {
        let value = attachment("report_2025.pdf").to_string();
        assert_eq!(value, r#"attachment; filename="report_2025.pdf""#);
    }

    #[test]
    fn test_attachment_adds_utf8_name() {
        let disposition = attachment("日報.pdf");
        assert!(disposition.to_string().contains("filename*=UTF-8''"));
    }
}
