use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "prompts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Owning user; nullable for system/anonymous submissions
    pub user_id: Option<i32>,

    #[sea_orm(column_type = "Text")]
    pub original_text: String,

    pub template_id: Option<String>,

    pub temperature: f64,

    pub max_tokens: i32,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::enhanced_prompts::Entity")]
    EnhancedPrompt,
}

impl Related<super::enhanced_prompts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EnhancedPrompt.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
