use crate::entities::{enhanced_prompts, prelude::*, prompts};
use anyhow::Result;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

/// Field values for a new enhancement row; the PTCF sections arrive already
/// serialized to JSON by the service layer.
#[derive(Debug, Clone)]
pub struct NewEnhancement {
    pub persona: String,
    pub task: String,
    pub context: String,
    pub format: String,
    pub consolidated_prompt: String,
    pub improvement_summary: String,
    pub model_used: String,
    pub tokens_used: Option<i32>,
    pub processing_time_ms: Option<i32>,
}

/// Repository for prompt submissions and their 1:1 enhancements.
pub struct PromptRepository {
    conn: DatabaseConnection,
}

impl PromptRepository {
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(
        &self,
        user_id: Option<i32>,
        original_text: &str,
        template_id: Option<&str>,
        temperature: f64,
        max_tokens: i32,
    ) -> Result<prompts::Model> {
        let now = chrono::Utc::now().to_rfc3339();

        let active_model = prompts::ActiveModel {
            user_id: Set(user_id),
            original_text: Set(original_text.to_string()),
            template_id: Set(template_id.map(str::to_string)),
            temperature: Set(temperature),
            max_tokens: Set(max_tokens),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let res = Prompts::insert(active_model).exec(&self.conn).await?;

        let row = Prompts::find_by_id(res.last_insert_id)
            .one(&self.conn)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Prompt {} vanished after insert", res.last_insert_id))?;

        Ok(row)
    }

    /// Insert the enhancement linked 1:1 to an existing prompt.
    pub async fn attach_enhancement(
        &self,
        prompt_id: i32,
        enhancement: NewEnhancement,
    ) -> Result<enhanced_prompts::Model> {
        let now = chrono::Utc::now().to_rfc3339();

        let active_model = enhanced_prompts::ActiveModel {
            prompt_id: Set(prompt_id),
            persona: Set(enhancement.persona),
            task: Set(enhancement.task),
            context: Set(enhancement.context),
            format: Set(enhancement.format),
            consolidated_prompt: Set(enhancement.consolidated_prompt),
            improvement_summary: Set(enhancement.improvement_summary),
            model_used: Set(enhancement.model_used),
            tokens_used: Set(enhancement.tokens_used),
            processing_time_ms: Set(enhancement.processing_time_ms),
            created_at: Set(now),
            ..Default::default()
        };

        let res = EnhancedPrompts::insert(active_model).exec(&self.conn).await?;

        let row = EnhancedPrompts::find_by_id(res.last_insert_id)
            .one(&self.conn)
            .await?
            .ok_or_else(|| {
                anyhow::anyhow!("Enhancement {} vanished after insert", res.last_insert_id)
            })?;

        Ok(row)
    }

    /// Prompt with its optional enhancement, scoped to the owner.
    pub async fn get_owned(
        &self,
        id: i32,
        user_id: i32,
    ) -> Result<Option<(prompts::Model, Option<enhanced_prompts::Model>)>> {
        let row = Prompts::find_by_id(id)
            .filter(prompts::Column::UserId.eq(user_id))
            .find_also_related(EnhancedPrompts)
            .one(&self.conn)
            .await?;

        Ok(row)
    }

    /// Caller's prompt history, newest first, with an optional inclusive
    /// RFC3339 range on creation time.
    pub async fn history(
        &self,
        user_id: i32,
        from: Option<&str>,
        to: Option<&str>,
        page: u64,
        page_size: u64,
    ) -> Result<(Vec<(prompts::Model, Option<enhanced_prompts::Model>)>, u64)> {
        let mut query = Prompts::find()
            .filter(prompts::Column::UserId.eq(user_id))
            .order_by_desc(prompts::Column::CreatedAt);

        if let Some(from) = from {
            query = query.filter(prompts::Column::CreatedAt.gte(from));
        }

        if let Some(to) = to {
            query = query.filter(prompts::Column::CreatedAt.lte(to));
        }

        let paginator = query
            .find_also_related(EnhancedPrompts)
            .paginate(&self.conn, page_size);
        let total_pages = paginator.num_pages().await?;
        let items = paginator.fetch_page(page - 1).await?;

        Ok((items, total_pages))
    }

    pub async fn count(&self) -> Result<u64> {
        Ok(Prompts::find().count(&self.conn).await?)
    }

    pub async fn count_enhanced(&self) -> Result<u64> {
        Ok(EnhancedPrompts::find().count(&self.conn).await?)
    }
}
