//! Course store backends
//!
//! The endpoint only ever reads: one exact-match lookup by course code that
//! skips records whose `active` flag is explicitly false. Table and column
//! names come from configuration, so they are checked against a strict
//! identifier pattern before being spliced into SQL.

use async_trait::async_trait;
use coursegate_core::{config_error, storage_error, CourseRecord, CourseStore, GateResult};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Row, SqlitePool,
};
use std::{collections::HashMap, str::FromStr};
use tracing::{debug, info};

/// Column holding the active flag. Not configurable.
pub const ACTIVE_FIELD: &str = "active";

const MAX_CONNECTIONS: u32 = 5;

/// Where course records live and how their columns are named
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// SQLite connection string; the only setting without a default
    pub database_url: Option<String>,
    /// SQLite schema holding the table
    pub database: String,
    /// Table name
    pub collection: String,
    pub code_field: String,
    pub redirect_field: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            database: "main".to_string(),
            collection: "course_codes".to_string(),
            code_field: "code".to_string(),
            redirect_field: "redirect_to".to_string(),
        }
    }
}

impl StoreConfig {
    /// Load store settings from `COURSEGATE_*` environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let var = |key: &str, default: String| std::env::var(key).unwrap_or(default);

        Self {
            database_url: std::env::var("COURSEGATE_DATABASE_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            database: var("COURSEGATE_DATABASE", defaults.database),
            collection: var("COURSEGATE_COLLECTION", defaults.collection),
            code_field: var("COURSEGATE_CODE_FIELD", defaults.code_field),
            redirect_field: var("COURSEGATE_REDIRECT_FIELD", defaults.redirect_field),
        }
    }

    /// Settings pointing at a database URL, other fields defaulted
    pub fn with_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: Some(database_url.into()),
            ..Self::default()
        }
    }

    /// Whether enough is set to attempt a connection
    pub fn is_configured(&self) -> bool {
        self.database_url.is_some() && !self.database.is_empty() && !self.collection.is_empty()
    }

    /// Reject names that cannot be used as bare SQL identifiers
    pub fn validate(&self) -> GateResult<()> {
        if self.database_url.is_none() {
            return Err(config_error!("COURSEGATE_DATABASE_URL is not set", "store"));
        }

        for (name, value) in [
            ("database", &self.database),
            ("collection", &self.collection),
            ("code_field", &self.code_field),
            ("redirect_field", &self.redirect_field),
        ] {
            if !is_identifier(value) {
                return Err(config_error!(
                    format!("{name} '{value}' is not a valid identifier"),
                    "store"
                ));
            }
        }

        Ok(())
    }

    fn table(&self) -> String {
        format!("\"{}\".\"{}\"", self.database, self.collection)
    }
}

/// `[A-Za-z_][A-Za-z0-9_]*`
pub fn is_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// SQLite-backed course store
pub struct SqliteCourseStore {
    pool: SqlitePool,
    config: StoreConfig,
    find_sql: String,
}

impl SqliteCourseStore {
    /// Connect to an existing database
    pub async fn open(config: &StoreConfig) -> GateResult<Self> {
        Self::connect(config, false).await
    }

    /// Connect, creating the database file and table when missing
    pub async fn create(config: &StoreConfig) -> GateResult<Self> {
        let store = Self::connect(config, true).await?;
        store.ensure_schema().await?;
        Ok(store)
    }

    async fn connect(config: &StoreConfig, create_if_missing: bool) -> GateResult<Self> {
        config.validate()?;
        let database_url = config.database_url.as_deref().unwrap_or_default();

        debug!("Connecting to course store: {}", database_url);

        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| storage_error!("Invalid database URL", "store", e))?
            .create_if_missing(create_if_missing);

        // Every connection to `:memory:` is a separate database.
        let max_connections = if database_url.contains(":memory:") {
            1
        } else {
            MAX_CONNECTIONS
        };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(|e| storage_error!("Failed to connect to course store", "store", e))?;

        info!(
            "Course store connected (table {}, {} connections max)",
            config.table(),
            max_connections
        );

        let find_sql = format!(
            "SELECT \"{code}\", \"{redirect}\", \"{active}\" FROM {table} \
             WHERE \"{code}\" = ?1 AND (\"{active}\" IS NULL OR \"{active}\" <> 0) LIMIT 1",
            code = config.code_field,
            redirect = config.redirect_field,
            active = ACTIVE_FIELD,
            table = config.table(),
        );

        Ok(Self {
            pool,
            config: config.clone(),
            find_sql,
        })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create the course table if it does not exist yet
    pub async fn ensure_schema(&self) -> GateResult<()> {
        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {table} (\
                \"{code}\" TEXT PRIMARY KEY, \
                \"{redirect}\" TEXT, \
                \"{active}\" INTEGER\
            )",
            table = self.config.table(),
            code = self.config.code_field,
            redirect = self.config.redirect_field,
            active = ACTIVE_FIELD,
        );

        sqlx::query(&sql)
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error!("Failed to create course table", "store", e))?;

        debug!("Course table ready: {}", self.config.table());
        Ok(())
    }

    /// Insert a record, replacing any record with the same code
    pub async fn upsert(&self, record: &CourseRecord) -> GateResult<()> {
        let sql = format!(
            "INSERT OR REPLACE INTO {table} (\"{code}\", \"{redirect}\", \"{active}\") \
             VALUES (?1, ?2, ?3)",
            table = self.config.table(),
            code = self.config.code_field,
            redirect = self.config.redirect_field,
            active = ACTIVE_FIELD,
        );

        sqlx::query(&sql)
            .bind(&record.code)
            .bind(&record.redirect_to)
            .bind(record.active)
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error!("Failed to save course record", "store", e))?;

        Ok(())
    }
}

#[async_trait]
impl CourseStore for SqliteCourseStore {
    async fn find_active(&self, code: &str) -> GateResult<Option<CourseRecord>> {
        let row = sqlx::query(&self.find_sql)
            .bind(code)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| storage_error!("Course lookup failed", "store", e))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let record = CourseRecord {
            code: row
                .try_get(0)
                .map_err(|e| storage_error!("Unreadable code column", "store", e))?,
            redirect_to: row
                .try_get(1)
                .map_err(|e| storage_error!("Unreadable redirect column", "store", e))?,
            active: row
                .try_get(2)
                .map_err(|e| storage_error!("Unreadable active column", "store", e))?,
        };

        Ok(Some(record))
    }

    fn backend(&self) -> &'static str {
        "sqlite"
    }
}

/// Fixed in-memory course table
#[derive(Debug, Default, Clone)]
pub struct MemoryCourseStore {
    records: HashMap<String, CourseRecord>,
}

impl MemoryCourseStore {
    /// Build the table. When a code repeats, the first active record wins,
    /// matching a `LIMIT 1` lookup over duplicate rows.
    pub fn new(records: impl IntoIterator<Item = CourseRecord>) -> Self {
        let mut table: HashMap<String, CourseRecord> = HashMap::new();
        for record in records {
            match table.get(&record.code) {
                Some(existing) if existing.is_active() || !record.is_active() => {}
                _ => {
                    table.insert(record.code.clone(), record);
                }
            }
        }
        Self { records: table }
    }
}

#[async_trait]
impl CourseStore for MemoryCourseStore {
    async fn find_active(&self, code: &str) -> GateResult<Option<CourseRecord>> {
        Ok(self
            .records
            .get(code)
            .filter(|record| record.is_active())
            .cloned())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_config(dir: &tempfile::TempDir) -> StoreConfig {
        let path = dir.path().join("courses.db");
        StoreConfig::with_url(format!("sqlite://{}", path.display()))
    }

    #[test]
    fn test_identifier_check() {
        assert!(is_identifier("course_codes"));
        assert!(is_identifier("_x1"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("1abc"));
        assert!(!is_identifier("codes\"; DROP TABLE x; --"));
        assert!(!is_identifier("course-codes"));
    }

    #[test]
    fn test_config_validation() {
        assert!(StoreConfig::default().validate().is_err());
        assert!(!StoreConfig::default().is_configured());

        let config = StoreConfig::with_url("sqlite::memory:");
        assert!(config.is_configured());
        assert!(config.validate().is_ok());

        let bad = StoreConfig {
            redirect_field: "redirect to".to_string(),
            ..config
        };
        assert!(bad.validate().is_err());
    }

    #[tokio::test]
    async fn test_memory_store_skips_inactive() {
        let store = MemoryCourseStore::new([
            CourseRecord::new("CP104", "/cp104/index.html"),
            CourseRecord::new("CP164", "/cp164/").inactive(),
        ]);

        assert!(store.find_active("CP104").await.unwrap().is_some());
        assert!(store.find_active("CP164").await.unwrap().is_none());
        assert!(store.find_active("cp104").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_store_keeps_first_active_duplicate() {
        let store = MemoryCourseStore::new([
            CourseRecord::new("CP104", "/retired/").inactive(),
            CourseRecord::new("CP104", "/cp104/week1/index.html"),
            CourseRecord::new("CP104", "/cp104/week2/index.html"),
            CourseRecord::new("CP104", "/cp104/archive/").inactive(),
        ]);

        let found = store.find_active("CP104").await.unwrap().unwrap();
        assert_eq!(found.next_path(), "/cp104/week1/index.html");
    }

    #[tokio::test]
    async fn test_sqlite_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteCourseStore::create(&temp_config(&dir)).await.unwrap();

        store
            .upsert(&CourseRecord::new("CP104", "/cp104/week1/index.html"))
            .await
            .unwrap();
        store
            .upsert(&CourseRecord::new("CP164", "/cp164/").inactive())
            .await
            .unwrap();
        store
            .upsert(&CourseRecord {
                code: "CP213".to_string(),
                redirect_to: None,
                active: Some(true),
            })
            .await
            .unwrap();

        let found = store.find_active("CP104").await.unwrap().unwrap();
        assert_eq!(found.redirect_to.as_deref(), Some("/cp104/week1/index.html"));
        assert!(found.is_active());

        assert!(store.find_active("CP164").await.unwrap().is_none());
        assert!(store.find_active("missing").await.unwrap().is_none());

        let no_redirect = store.find_active("CP213").await.unwrap().unwrap();
        assert_eq!(no_redirect.next_path(), "/index.html");
    }

    #[tokio::test]
    async fn test_upsert_replaces_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteCourseStore::create(&temp_config(&dir)).await.unwrap();

        store.upsert(&CourseRecord::new("CP104", "/old/")).await.unwrap();
        store.upsert(&CourseRecord::new("CP104", "/new/")).await.unwrap();

        let found = store.find_active("CP104").await.unwrap().unwrap();
        assert_eq!(found.redirect_to.as_deref(), Some("/new/"));
    }

    #[tokio::test]
    async fn test_open_missing_database_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(SqliteCourseStore::open(&temp_config(&dir)).await.is_err());
    }

    #[tokio::test]
    async fn test_custom_column_names() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig {
            collection: "courses".to_string(),
            code_field: "course_code".to_string(),
            redirect_field: "landing".to_string(),
            ..temp_config(&dir)
        };
        let store = SqliteCourseStore::create(&config).await.unwrap();
        store.upsert(&CourseRecord::new("BU111", "/bu111/")).await.unwrap();

        let found = store.find_active("BU111").await.unwrap().unwrap();
        assert_eq!(found.next_path(), "/bu111/");
        assert_eq!(store.backend(), "sqlite");
    }
}
