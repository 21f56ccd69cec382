use sea_orm::entity::prelude::*;

/// PTCF enhancement produced by the model, one per prompt.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "enhanced_prompts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub prompt_id: i32,

    /// JSON blobs of the typed PTCF sections
    #[sea_orm(column_type = "Text")]
    pub persona: String,

    #[sea_orm(column_type = "Text")]
    pub task: String,

    #[sea_orm(column_type = "Text")]
    pub context: String,

    #[sea_orm(column_type = "Text")]
    pub format: String,

    #[sea_orm(column_type = "Text")]
    pub consolidated_prompt: String,

    #[sea_orm(column_type = "Text")]
    pub improvement_summary: String,

    pub model_used: String,

    pub tokens_used: Option<i32>,

    pub processing_time_ms: Option<i32>,

    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::prompts::Entity",
        from = "Column::PromptId",
        to = "super::prompts::Column::Id"
    )]
    Prompt,
}

impl Related<super::prompts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Prompt.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
