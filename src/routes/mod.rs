pub mod auth;

pub mod groups;

pub mod works;

pub mod messages;

pub mod resources;

pub mod storage;

pub use auth::configure_auth_routes;
pub use groups::configure_groups_routes;
pub use messages::configure_messages_routes;
pub use resources::configure_resources_routes;
pub use storage::configure_storage_routes;
pub use works::configure_works_routes;
