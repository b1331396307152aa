use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod migrator;
pub mod repositories;

pub use repositories::profile::{CreateOutcome, Profile};
pub use repositories::search_log::{NewSearchLog, SearchLogEntry};

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

/// Path of an on-disk SQLite database, `None` for memory or other backends.
fn sqlite_file_path(db_url: &str) -> Option<&str> {
    let path = db_url.strip_prefix("sqlite:")?;
    let path = path.trim_start_matches("//");
    let path = path.split('?').next().unwrap_or(path);

    if path.is_empty() || path.starts_with(":memory:") {
        None
    } else {
        Some(path)
    }
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

        if let Some(path_str) = sqlite_file_path(db_url) {
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        // An in-memory SQLite database lives per connection; keep one.
        let (max_connections, min_connections) = if db_url.contains(":memory:") {
            (1, 1)
        } else {
            (max_connections, min_connections)
        };

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

    fn profile_repo(&self) -> repositories::profile::ProfileRepository {
        repositories::profile::ProfileRepository::new(self.conn.clone())
    }

    fn search_log_repo(&self) -> repositories::search_log::SearchLogRepository {
        repositories::search_log::SearchLogRepository::new(self.conn.clone())
    }

    pub async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>> {
        self.profile_repo().get_by_user_id(user_id).await
    }

    pub async fn create_profile(&self, user_id: &str, email: &str) -> Result<CreateOutcome> {
        self.profile_repo().create(user_id, email).await
    }

    pub async fn add_search_log(&self, entry: NewSearchLog<'_>) -> Result<i32> {
        self.search_log_repo().add(entry).await
    }

    pub async fn recent_searches(&self, user_id: &str, limit: u64) -> Result<Vec<SearchLogEntry>> {
        self.search_log_repo().recent_for_user(user_id, limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlite_file_path() {
        assert_eq!(sqlite_file_path("sqlite:data/investai.db"), Some("data/investai.db"));
        assert_eq!(sqlite_file_path("sqlite://data/app.db?mode=rwc"), Some("data/app.db"));
        assert_eq!(sqlite_file_path("sqlite::memory:"), None);
        assert_eq!(sqlite_file_path("postgres://localhost/investai"), None);
    }

    #[tokio::test]
    async fn test_profile_roundtrip() {
        let store = Store::new("sqlite::memory:").await.unwrap();

        assert!(store.get_profile("user_1").await.unwrap().is_none());
        assert_eq!(
            store.create_profile("user_1", "a@example.com").await.unwrap(),
            CreateOutcome::Created
        );
        assert_eq!(
            store.create_profile("user_1", "a@example.com").await.unwrap(),
            CreateOutcome::AlreadyExists
        );

        let profile = store.get_profile("user_1").await.unwrap().unwrap();
        assert_eq!(profile.email, "a@example.com");
        assert!(!profile.subscription_active);
        assert!(profile.subscription_tier.is_none());
    }

    #[tokio::test]
    async fn test_search_history_is_per_user_newest_first() {
        let store = Store::new("sqlite::memory:").await.unwrap();

        for (user, request) in [("u1", "first"), ("u2", "other"), ("u1", "second")] {
            store
                .add_search_log(NewSearchLog {
                    user_id: Some(user),
                    request,
                    response: "answer",
                    ticker: None,
                    intent: "investment_advice",
                })
                .await
                .unwrap();
        }

        let history = store.recent_searches("u1", 10).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].request, "second");
        assert_eq!(history[1].request, "first");

        let history = store.recent_searches("u1", 1).await.unwrap();
        assert_eq!(history.len(), 1);
    }
}
