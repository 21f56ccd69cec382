use crate::entities::prelude::*;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Schema;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        manager
            .create_table(
                schema
                    .create_table_from_entity(Templates)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Prompts)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(EnhancedPrompts)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(SavedPrompts)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        let conn = manager.get_connection();

        // One saved row per (owner, prompt, enhancement) triple; duplicate
        // inserts must fail at the database, not in application code.
        conn.execute_unprepared(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_saved_prompts_owner_pair \
             ON saved_prompts(user_id, prompt_id, enhanced_id)",
        )
        .await?;

        conn.execute_unprepared(
            "CREATE INDEX IF NOT EXISTS idx_prompts_user_created \
             ON prompts(user_id, created_at)",
        )
        .await?;

        conn.execute_unprepared(
            "CREATE INDEX IF NOT EXISTS idx_saved_prompts_user_favorite \
             ON saved_prompts(user_id, is_favorite)",
        )
        .await?;

        conn.execute_unprepared(
            "CREATE INDEX IF NOT EXISTS idx_templates_category ON templates(category)",
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SavedPrompts).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(EnhancedPrompts).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Prompts).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Templates).to_owned())
            .await?;

        Ok(())
    }
}
