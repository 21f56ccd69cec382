use sea_orm::entity::prelude::*;

/// User bookmark over a (prompt, enhancement) pair.
///
/// Uniqueness of (user_id, prompt_id, enhanced_id) is enforced by a
/// database index created in the initial migration.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "saved_prompts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub user_id: i32,

    pub prompt_id: i32,

    pub enhanced_id: i32,

    pub custom_title: Option<String>,

    #[sea_orm(column_type = "Text")]
    pub notes: String,

    pub category: String,

    pub is_favorite: bool,

    pub created_at: String,

    pub last_accessed: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
