pub mod extractor;
pub mod jwt;
pub mod parameter_error_handler;
pub mod validate;

pub use extractor::{SafeGroupId, SafeMessageId, SafeResourceId, SafeStudentId, SafeWorkId};
pub use parameter_error_handler::{json_error_handler, query_error_handler};
