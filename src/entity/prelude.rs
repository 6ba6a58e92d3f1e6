//! 预导入模块，方便使用

pub use super::favorite_resources::{
    ActiveModel as FavoriteResourceActiveModel, Entity as FavoriteResources,
    Model as FavoriteResourceModel,
};
pub use super::feedback::{
    ActiveModel as FeedbackActiveModel, Entity as Feedback, Model as FeedbackModel,
};
pub use super::group_members::{
    ActiveModel as GroupMemberActiveModel, Entity as GroupMembers, Model as GroupMemberModel,
};
pub use super::groups::{ActiveModel as GroupActiveModel, Entity as Groups, Model as GroupModel};
pub use super::messages::{
    ActiveModel as MessageActiveModel, Entity as Messages, Model as MessageModel,
};
pub use super::resources::{
    ActiveModel as ResourceActiveModel, Entity as Resources, Model as ResourceModel,
};
pub use super::users::{ActiveModel as UserActiveModel, Entity as Users, Model as UserModel};
pub use super::works::{ActiveModel as WorkActiveModel, Entity as Works, Model as WorkModel};
