use crate::entities::{prelude::*, templates};
use anyhow::Result;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};

/// Repository for the read-only template catalog.
pub struct TemplateRepository {
    conn: DatabaseConnection,
}

impl TemplateRepository {
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Active templates for public listing, optionally narrowed to a category.
    pub async fn list_active(&self, category: Option<&str>) -> Result<Vec<templates::Model>> {
        let mut query = Templates::find()
            .filter(templates::Column::IsActive.eq(true))
            .order_by_asc(templates::Column::Category)
            .order_by_asc(templates::Column::Name);

        if let Some(category) = category {
            query = query.filter(templates::Column::Category.eq(category));
        }

        Ok(query.all(&self.conn).await?)
    }

    /// Single active template for public retrieval.
    pub async fn get_active(&self, id: &str) -> Result<Option<templates::Model>> {
        let row = Templates::find_by_id(id)
            .filter(templates::Column::IsActive.eq(true))
            .one(&self.conn)
            .await?;
        Ok(row)
    }

    /// Lookup for enhancement resolution. The active flag gates public
    /// listing only; a template referenced by id stays resolvable.
    pub async fn get(&self, id: &str) -> Result<Option<templates::Model>> {
        Ok(Templates::find_by_id(id).one(&self.conn).await?)
    }
}
