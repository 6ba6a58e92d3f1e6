pub mod common;
pub mod groups;
pub mod messages;
pub mod objects;
pub mod resources;
pub mod users;
pub mod works;

pub use common::response::ApiResponse;

use serde::{Deserialize, Serialize};

// 程序启动时间
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

/// 业务错误码
///
/// 0 表示成功；1xxx 为通用错误，其余按业务模块分段。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    // 通用
    BadRequest = 1000,
    Unauthorized = 1001,
    Forbidden = 1003,
    NotFound = 1004,
    RateLimitExceeded = 1029,
    InternalServerError = 1500,

    // 用户
    UserNotFound = 2001,
    ProfileUpdateFailed = 2002,
    ProfileProvisionFailed = 2003,

    // 小组
    GroupNotFound = 3001,
    GroupMentorInvalid = 3002,
    GroupMemberInvalid = 3003,
    GroupPermissionDenied = 3004,

    // 作品
    WorkNotFound = 4001,
    WorkFieldNotAllowed = 4002,
    WorkStatusInvalid = 4003,
    WorkPermissionDenied = 4004,
    FeedbackCommentRequired = 4005,
    FeedbackRatingInvalid = 4006,

    // 消息
    MessageNotFound = 5001,
    MessageContentRequired = 5002,
    MessagePermissionDenied = 5003,

    // 学习资源
    ResourceNotFound = 6001,
    ResourcePermissionDenied = 6002,
    SearchQueryRequired = 6003,

    // 对象存储
    BucketNotFound = 7001,
    ObjectNotFound = 7002,
    ObjectPathInvalid = 7003,
    SignedUrlInvalid = 7004,
    FileSizeExceeded = 7005,
    StoragePermissionDenied = 7006,
}
