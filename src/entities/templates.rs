use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "templates")]
pub struct Model {
    /// Slug identifier, e.g. `code-gen`
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub name: String,

    /// One of: code, content, data, creative, business, research
    pub category: String,

    #[sea_orm(column_type = "Text")]
    pub description: String,

    /// System instruction applied when this template is selected
    #[sea_orm(column_type = "Text")]
    pub system_prompt: String,

    pub is_active: bool,

    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
