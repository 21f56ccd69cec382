use std::collections::HashMap;

use crate::entities::{enhanced_prompts, prelude::*, prompts, saved_prompts};
use anyhow::Result;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

/// A saved bookmark joined with the prompt pair it references.
#[derive(Debug, Clone)]
pub struct SavedItemRow {
    pub saved: saved_prompts::Model,
    pub prompt: prompts::Model,
    pub enhanced: enhanced_prompts::Model,
}

/// Outcome of a create attempt; duplicates are detected by the database
/// unique index, not by a check-then-create round trip.
#[derive(Debug)]
pub enum SavedCreateOutcome {
    Created(saved_prompts::Model),
    Duplicate,
}

pub struct SavedRepository {
    conn: DatabaseConnection,
}

impl SavedRepository {
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        user_id: i32,
        prompt_id: i32,
        enhanced_id: i32,
        custom_title: Option<&str>,
        notes: &str,
        category: &str,
        is_favorite: bool,
    ) -> Result<SavedCreateOutcome> {
        let now = chrono::Utc::now().to_rfc3339();

        let active_model = saved_prompts::ActiveModel {
            user_id: Set(user_id),
            prompt_id: Set(prompt_id),
            enhanced_id: Set(enhanced_id),
            custom_title: Set(custom_title.map(str::to_string)),
            notes: Set(notes.to_string()),
            category: Set(category.to_string()),
            is_favorite: Set(is_favorite),
            created_at: Set(now.clone()),
            last_accessed: Set(now),
            ..Default::default()
        };

        let res = match SavedPrompts::insert(active_model).exec(&self.conn).await {
            Ok(res) => res,
            Err(err) => {
                if matches!(err.sql_err(), Some(sea_orm::SqlErr::UniqueConstraintViolation(_))) {
                    return Ok(SavedCreateOutcome::Duplicate);
                }
                return Err(err.into());
            }
        };

        let row = SavedPrompts::find_by_id(res.last_insert_id)
            .one(&self.conn)
            .await?
            .ok_or_else(|| {
                anyhow::anyhow!("Saved prompt {} vanished after insert", res.last_insert_id)
            })?;

        Ok(SavedCreateOutcome::Created(row))
    }

    /// Caller's saved items, most recently touched first.
    pub async fn list(&self, user_id: i32, favorites_only: bool) -> Result<Vec<SavedItemRow>> {
        let mut query = SavedPrompts::find()
            .filter(saved_prompts::Column::UserId.eq(user_id))
            .order_by_desc(saved_prompts::Column::LastAccessed);

        if favorites_only {
            query = query.filter(saved_prompts::Column::IsFavorite.eq(true));
        }

        let saved_rows = query.all(&self.conn).await?;
        self.join_pairs(saved_rows).await
    }

    pub async fn get(&self, id: i32, user_id: i32) -> Result<Option<SavedItemRow>> {
        let row = SavedPrompts::find_by_id(id)
            .filter(saved_prompts::Column::UserId.eq(user_id))
            .one(&self.conn)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(self.join_pairs(vec![row]).await?.into_iter().next())
    }

    /// Flip the favorite flag and refresh the last-accessed stamp.
    /// Returns None when the item does not exist for this owner.
    pub async fn toggle_favorite(
        &self,
        id: i32,
        user_id: i32,
    ) -> Result<Option<saved_prompts::Model>> {
        use sea_orm::ActiveModelTrait;

        let row = SavedPrompts::find_by_id(id)
            .filter(saved_prompts::Column::UserId.eq(user_id))
            .one(&self.conn)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let flipped = !row.is_favorite;
        let mut active: saved_prompts::ActiveModel = row.into();
        active.is_favorite = Set(flipped);
        active.last_accessed = Set(chrono::Utc::now().to_rfc3339());
        let updated = active.update(&self.conn).await?;

        Ok(Some(updated))
    }

    pub async fn remove(&self, id: i32, user_id: i32) -> Result<bool> {
        let result = SavedPrompts::delete_many()
            .filter(saved_prompts::Column::Id.eq(id))
            .filter(saved_prompts::Column::UserId.eq(user_id))
            .exec(&self.conn)
            .await?;

        Ok(result.rows_affected > 0)
    }

    pub async fn count(&self) -> Result<u64> {
        Ok(SavedPrompts::find().count(&self.conn).await?)
    }

    /// Resolve the referenced prompt and enhancement rows in two batched
    /// queries instead of one round trip per saved item.
    async fn join_pairs(&self, saved_rows: Vec<saved_prompts::Model>) -> Result<Vec<SavedItemRow>> {
        if saved_rows.is_empty() {
            return Ok(Vec::new());
        }

        let prompt_ids: Vec<i32> = saved_rows.iter().map(|s| s.prompt_id).collect();
        let enhanced_ids: Vec<i32> = saved_rows.iter().map(|s| s.enhanced_id).collect();

        let prompts_by_id: HashMap<i32, prompts::Model> = Prompts::find()
            .filter(prompts::Column::Id.is_in(prompt_ids))
            .all(&self.conn)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let enhanced_by_id: HashMap<i32, enhanced_prompts::Model> = EnhancedPrompts::find()
            .filter(enhanced_prompts::Column::Id.is_in(enhanced_ids))
            .all(&self.conn)
            .await?
            .into_iter()
            .map(|e| (e.id, e))
            .collect();

        let rows = saved_rows
            .into_iter()
            .filter_map(|saved| {
                let prompt = prompts_by_id.get(&saved.prompt_id)?.clone();
                let enhanced = enhanced_by_id.get(&saved.enhanced_id)?.clone();
                Some(SavedItemRow {
                    saved,
                    prompt,
                    enhanced,
                })
            })
            .collect();

        Ok(rows)
    }
}
