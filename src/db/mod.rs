use anyhow::Result;
use async_trait::async_trait;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::domain::InquiryId;
use crate::models::inquiry::{Inquiry, NewInquiry};

pub mod migrator;
pub mod repositories;

pub use repositories::inquiry::InquiryRepository;

/// Write side of the inquiry store as seen by the submission service.
///
/// The service receives this as an injected handle so tests can swap in a
/// fake without touching a database.
#[async_trait]
pub trait InquiryStore: Send + Sync {
    /// Persists one inquiry and returns the identifier the store assigned.
    async fn insert_inquiry(&self, inquiry: NewInquiry) -> Result<InquiryId>;

    /// Cheap connectivity probe.
    async fn ping(&self) -> Result<()>;
}

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

        let in_memory = db_url.contains(":memory:");

        if let Some(path_str) = sqlite_file_path(db_url) {
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        // Every pooled connection to `:memory:` would see its own empty database.
        let (max_connections, min_connections) = if in_memory {
            (1, 1)
        } else {
            (max_connections, min_connections)
        };

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .sqlx_logging(false);

        if !in_memory {
            opt.idle_timeout(Duration::from_secs(300))
                .max_lifetime(Duration::from_secs(600));
        }

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

    fn inquiry_repo(&self) -> InquiryRepository {
        InquiryRepository::new(self.conn.clone())
    }

    pub async fn add_inquiry(&self, inquiry: NewInquiry) -> Result<Inquiry> {
        self.inquiry_repo().add(inquiry).await
    }

    pub async fn get_inquiry(&self, id: &str) -> Result<Option<Inquiry>> {
        self.inquiry_repo().get(id).await
    }

    pub async fn count_inquiries(&self) -> Result<u64> {
        self.inquiry_repo().count().await
    }

    pub async fn list_recent_inquiries(&self, limit: u64) -> Result<Vec<Inquiry>> {
        self.inquiry_repo().list_recent(limit).await
    }
}

#[async_trait]
impl InquiryStore for Store {
    async fn insert_inquiry(&self, inquiry: NewInquiry) -> Result<InquiryId> {
        Ok(self.add_inquiry(inquiry).await?.id)
    }

    async fn ping(&self) -> Result<()> {
        Self::ping(self).await
    }
}

/// File path of a file-backed SQLite URL, without the query string.
fn sqlite_file_path(db_url: &str) -> Option<&str> {
    let rest = db_url.strip_prefix("sqlite:")?;
    if rest.contains(":memory:") {
        return None;
    }
    let rest = rest.trim_start_matches("//");
    let path = rest.split('?').next().unwrap_or(rest);
    (!path.is_empty()).then_some(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlite_file_path_extraction() {
        assert_eq!(
            sqlite_file_path("sqlite:data/atelier.db"),
            Some("data/atelier.db")
        );
        assert_eq!(
            sqlite_file_path("sqlite:///tmp/atelier.db?mode=rwc"),
            Some("/tmp/atelier.db")
        );
        assert_eq!(sqlite_file_path("sqlite::memory:"), None);
        assert_eq!(sqlite_file_path("postgres://localhost/atelier"), None);
    }

    #[tokio::test]
    async fn in_memory_store_migrates_and_pings() {
        let store = Store::new("sqlite::memory:").await.unwrap();
        store.ping().await.unwrap();
        assert_eq!(store.count_inquiries().await.unwrap(), 0);
    }
}
