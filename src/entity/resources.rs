//! 学习资源实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "resources")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub url: Option<String>,
    pub file_path: Option<String>,
    pub resource_type: Option<String>,
    /// JSON 数组字符串
    pub tags: String,
    pub uploaded_by: Option<Uuid>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UploadedBy",
        to = "super::users::Column::Id"
    )]
    Uploader,
    #[sea_orm(has_many = "super::favorite_resources::Entity")]
    Favorites,
}

impl Related<super::favorite_resources::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Favorites.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_resource(self) -> crate::models::resources::entities::Resource {
        use crate::models::resources::entities::Resource;

        Resource {
            id: self.id,
            title: self.title,
            description: self.description,
            url: self.url,
            file_path: self.file_path,
            resource_type: self.resource_type,
            tags: serde_json::from_str(&self.tags).unwrap_or_default(),
            uploaded_by: self.uploaded_by,
            created_at: super::to_datetime(self.created_at),
            updated_at: super::to_datetime(self.updated_at),
        }
    }
}
