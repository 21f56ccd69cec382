use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::entities::{enhanced_prompts, prompts, saved_prompts, templates};

pub mod migrator;
pub mod repositories;

pub use repositories::prompt::NewEnhancement;
pub use repositories::saved::{SavedCreateOutcome, SavedItemRow};
pub use repositories::user::User;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.starts_with(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn template_repo(&self) -> repositories::template::TemplateRepository {
        repositories::template::TemplateRepository::new(self.conn.clone())
    }

    fn prompt_repo(&self) -> repositories::prompt::PromptRepository {
        repositories::prompt::PromptRepository::new(self.conn.clone())
    }

    fn saved_repo(&self) -> repositories::saved::SavedRepository {
        repositories::saved::SavedRepository::new(self.conn.clone())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    // ------------------------------------------------------------------
    // Templates
    // ------------------------------------------------------------------

    pub async fn list_active_templates(
        &self,
        category: Option<&str>,
    ) -> Result<Vec<templates::Model>> {
        self.template_repo().list_active(category).await
    }

    pub async fn get_active_template(&self, id: &str) -> Result<Option<templates::Model>> {
        self.template_repo().get_active(id).await
    }

    pub async fn get_template(&self, id: &str) -> Result<Option<templates::Model>> {
        self.template_repo().get(id).await
    }

    // ------------------------------------------------------------------
    // Prompts & enhancements
    // ------------------------------------------------------------------

    pub async fn create_prompt(
        &self,
        user_id: Option<i32>,
        original_text: &str,
        template_id: Option<&str>,
        temperature: f64,
        max_tokens: i32,
    ) -> Result<prompts::Model> {
        self.prompt_repo()
            .create(user_id, original_text, template_id, temperature, max_tokens)
            .await
    }

    pub async fn attach_enhancement(
        &self,
        prompt_id: i32,
        enhancement: NewEnhancement,
    ) -> Result<enhanced_prompts::Model> {
        self.prompt_repo()
            .attach_enhancement(prompt_id, enhancement)
            .await
    }

    pub async fn get_owned_prompt(
        &self,
        id: i32,
        user_id: i32,
    ) -> Result<Option<(prompts::Model, Option<enhanced_prompts::Model>)>> {
        self.prompt_repo().get_owned(id, user_id).await
    }

    pub async fn prompt_history(
        &self,
        user_id: i32,
        from: Option<&str>,
        to: Option<&str>,
        page: u64,
        page_size: u64,
    ) -> Result<(Vec<(prompts::Model, Option<enhanced_prompts::Model>)>, u64)> {
        self.prompt_repo()
            .history(user_id, from, to, page, page_size)
            .await
    }

    pub async fn count_prompts(&self) -> Result<u64> {
        self.prompt_repo().count().await
    }

    pub async fn count_enhancements(&self) -> Result<u64> {
        self.prompt_repo().count_enhanced().await
    }

    // ------------------------------------------------------------------
    // Saved items
    // ------------------------------------------------------------------

    #[allow(clippy::too_many_arguments)]
    pub async fn create_saved_prompt(
        &self,
        user_id: i32,
        prompt_id: i32,
        enhanced_id: i32,
        custom_title: Option<&str>,
        notes: &str,
        category: &str,
        is_favorite: bool,
    ) -> Result<SavedCreateOutcome> {
        self.saved_repo()
            .create(
                user_id,
                prompt_id,
                enhanced_id,
                custom_title,
                notes,
                category,
                is_favorite,
            )
            .await
    }

    pub async fn list_saved_prompts(
        &self,
        user_id: i32,
        favorites_only: bool,
    ) -> Result<Vec<SavedItemRow>> {
        self.saved_repo().list(user_id, favorites_only).await
    }

    pub async fn get_saved_prompt(&self, id: i32, user_id: i32) -> Result<Option<SavedItemRow>> {
        self.saved_repo().get(id, user_id).await
    }

    pub async fn toggle_saved_favorite(
        &self,
        id: i32,
        user_id: i32,
    ) -> Result<Option<saved_prompts::Model>> {
        self.saved_repo().toggle_favorite(id, user_id).await
    }

    pub async fn remove_saved_prompt(&self, id: i32, user_id: i32) -> Result<bool> {
        self.saved_repo().remove(id, user_id).await
    }

    pub async fn count_saved_prompts(&self) -> Result<u64> {
        self.saved_repo().count().await
    }

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.user_repo().get_by_username(username).await
    }

    pub async fn verify_user_password(&self, username: &str, password: &str) -> Result<bool> {
        self.user_repo().verify_password(username, password).await
    }

    pub async fn verify_api_key(&self, api_key: &str) -> Result<Option<User>> {
        self.user_repo().verify_api_key(api_key).await
    }

    pub async fn get_user_api_key(&self, username: &str) -> Result<Option<String>> {
        self.user_repo().get_api_key(username).await
    }

    pub async fn regenerate_user_api_key(&self, username: &str) -> Result<String> {
        self.user_repo().regenerate_api_key(username).await
    }
}
