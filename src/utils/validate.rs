use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

// 文件名中允许保留的字符，其余替换为下划线
static FILE_NAME_UNSAFE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9._-]+").expect("Invalid file name regex"));

// 路径段中不允许出现控制字符和反斜杠
static SEGMENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\\\x00-\x1f]+$").expect("Invalid path segment regex"));

/// 校验对象路径（bucket 内的相对路径）
pub fn validate_object_path(path: &str) -> Result<(), &'static str> {
    if path.is_empty() {
        return Err("Object path must not be empty");
    }
    // 禁止绝对路径
    if path.starts_with('/') {
        return Err("Object path must be relative");
    }
    for segment in path.split('/') {
        if segment.is_empty() {
            return Err("Object path contains an empty segment");
        }
        // 禁止目录穿越
        if segment == "." || segment == ".." {
            return Err("Object path must not contain '.' or '..' segments");
        }
        if !SEGMENT_RE.is_match(segment) {
            return Err("Object path contains invalid characters");
        }
    }
    Ok(())
}

/// 校验上传时指定的目录，空目录视为根目录
pub fn validate_folder(folder: &str) -> Result<(), &'static str> {
    let folder = folder.trim_matches('/');
    if folder.is_empty() {
        return Ok(());
    }
    validate_object_path(folder)
}

/// 拆分 `{bucket}/{path..}`，至少需要 bucket 和文件两段
pub fn split_bucket_path(full: &str) -> Result<(&str, &str), &'static str> {
    let full = full.trim_start_matches('/');
    match full.split_once('/') {
        Some((bucket, path)) if !bucket.is_empty() && !path.is_empty() => Ok((bucket, path)),
        _ => Err("Invalid file path"),
    }
}

/// 清理上传文件名
pub fn sanitize_file_name(file_name: &str) -> String {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    let cleaned = FILE_NAME_UNSAFE_RE.replace_all(base.trim(), "_");
    let cleaned = cleaned.trim_matches('.');
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned.to_string()
    }
}

/// 生成上传对象路径：`[folder/]<user_id>/<basename>_<timestamp>.<ext>`
///
/// 路径中包含上传者 ID，删除和下载权限依赖这一约定。
pub fn build_object_path(
    folder: Option<&str>,
    user_id: Uuid,
    file_name: &str,
    now: chrono::DateTime<chrono::Utc>,
) -> String {
    let file_name = sanitize_file_name(file_name);
    let timestamp = now
        .format("%Y-%m-%dT%H-%M-%S-%3fZ")
        .to_string();

    let unique_name = match file_name.rsplit_once('.') {
        Some((base, ext)) if !base.is_empty() && !ext.is_empty() => {
            format!("{base}_{timestamp}.{ext}")
        }
        _ => format!("{file_name}_{timestamp}"),
    };

    match folder.map(|f| f.trim_matches('/')).filter(|f| !f.is_empty()) {
        Some(folder) => format!("{folder}/{user_id}/{unique_name}"),
        None => format!("{user_id}/{unique_name}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_validate_object_path() {
        assert!(validate_object_path("u1/report.pdf").is_ok());
        assert!(validate_object_path("").is_err());
        assert!(validate_object_path("/etc/passwd").is_err());
        assert!(validate_object_path("u1/../../etc/passwd").is_err());
        assert!(validate_object_path("u1//a.pdf").is_err());
        assert!(validate_object_path("u1\\a.pdf").is_err());
    }

    #[test]
    fn test_split_bucket_path() {
        assert_eq!(
            split_bucket_path("works/u1/a.pdf").unwrap(),
            ("works", "u1/a.pdf")
        );
        assert!(split_bucket_path("works").is_err());
        assert!(split_bucket_path("works/").is_err());
    }

    #[test]
    fn test_build_object_path() {
        let user_id = Uuid::nil();
        let now = chrono::Utc
            .with_ymd_and_hms(2025, 5, 20, 8, 30, 15)
            .unwrap();

        assert_eq!(
            build_object_path(None, user_id, "day 1.pdf", now),
            format!("{user_id}/day_1_2025-05-20T08-30-15-000Z.pdf")
        );
        assert_eq!(
            build_object_path(Some("reports/"), user_id, "notes", now),
            format!("reports/{user_id}/notes_2025-05-20T08-30-15-000Z")
        );
    }

    #[test]
    fn test_sanitize_file_name_strips_directories() {
        assert_eq!(sanitize_file_name("../../evil.sh"), "evil.sh");
        assert_eq!(sanitize_file_name("..."), "file");
    }
}
