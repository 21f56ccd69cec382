use crate::entities::prelude::*;
use crate::entities::templates;
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Built-in template catalog, one preset per category.
const TEMPLATES: &[(&str, &str, &str, &str, &str)] = &[
    (
        "code-gen",
        "Code Generation",
        "code",
        "Turn vague coding requests into precise implementation briefs.",
        "You are a senior software engineer specializing in prompt engineering \
         for code generation. Produce prompts that pin down language, framework, \
         constraints, and expected output format.",
    ),
    (
        "content-writing",
        "Content Writing",
        "content",
        "Shape loose writing ideas into briefs with audience, tone, and structure.",
        "You are an editorial strategist specializing in prompt engineering for \
         long-form content. Produce prompts that fix audience, voice, structure, \
         and length expectations.",
    ),
    (
        "data-analysis",
        "Data Analysis",
        "data",
        "Reframe open-ended data questions as concrete analysis tasks.",
        "You are a data analyst specializing in prompt engineering for analytical \
         work. Produce prompts that specify the dataset context, the metrics that \
         matter, and the expected deliverable.",
    ),
    (
        "creative-writing",
        "Creative Writing",
        "creative",
        "Expand story seeds into structured creative briefs.",
        "You are a fiction editor specializing in prompt engineering for creative \
         writing. Produce prompts that establish genre, point of view, tone, and \
         the shape of the piece.",
    ),
    (
        "business-docs",
        "Business Documents",
        "business",
        "Convert rough asks into specifications for business documents.",
        "You are a management consultant specializing in prompt engineering for \
         business writing. Produce prompts that define the stakeholders, the \
         decision the document supports, and the required format.",
    ),
    (
        "research-summary",
        "Research Summary",
        "research",
        "Sharpen broad research questions into scoped literature tasks.",
        "You are a research librarian specializing in prompt engineering for \
         research synthesis. Produce prompts that bound the scope, name the \
         source expectations, and fix the summary structure.",
    ),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let now = chrono::Utc::now().to_rfc3339();

        for (id, name, category, description, system_prompt) in TEMPLATES {
            let insert = sea_orm_migration::sea_query::Query::insert()
                .into_table(Templates)
                .columns([
                    templates::Column::Id,
                    templates::Column::Name,
                    templates::Column::Category,
                    templates::Column::Description,
                    templates::Column::SystemPrompt,
                    templates::Column::IsActive,
                    templates::Column::CreatedAt,
                ])
                .values_panic([
                    (*id).into(),
                    (*name).into(),
                    (*category).into(),
                    (*description).into(),
                    (*system_prompt).into(),
                    true.into(),
                    now.clone().into(),
                ])
                .to_owned();

            manager.exec_stmt(insert).await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();
        conn.execute_unprepared("DELETE FROM templates").await?;
        Ok(())
    }
}
