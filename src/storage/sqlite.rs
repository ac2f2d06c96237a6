use super::{error::Result, error::StorageError, CourseStore};
use crate::core::{Course, CourseId, Modality};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Pool, Row, Sqlite, SqlitePool};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

/// Default pool size for the SQLite connection pool.
const DEFAULT_POOL_SIZE: u32 = 10;

/// Default connection timeout in seconds.
const DEFAULT_CONNECTION_TIMEOUT_SECS: u64 = 30;

/// Configuration for the SQLite connection pool.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Maximum number of connections in the pool.
    pub max_size: u32,
    /// Minimum number of idle connections to maintain.
    pub min_idle: Option<u32>,
    /// Maximum time to wait for a connection from the pool.
    pub connection_timeout: Duration,
    /// Maximum lifetime of a connection.
    pub max_lifetime: Option<Duration>,
    /// Idle timeout for connections.
    pub idle_timeout: Option<Duration>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_POOL_SIZE,
            min_idle: Some(2),
            connection_timeout: Duration::from_secs(DEFAULT_CONNECTION_TIMEOUT_SECS),
            max_lifetime: None,
            idle_timeout: Some(Duration::from_secs(600)), // 10 minutes
        }
    }
}

/// SQLite-based course store with connection pooling.
///
/// Courses live in a `courses` table; the prerequisite edge set lives in a
/// `course_prerequisites` join table whose `position` column preserves
/// attachment order. `save` rewrites a course's edge rows inside a single
/// transaction so readers never observe a half-written set.
pub struct SqliteCourseStore {
    pool: SqlitePool,
    db_path: String,
}

impl SqliteCourseStore {
    /// Creates a new SQLite course store with the specified database path.
    ///
    /// Uses default pool configuration.
    pub async fn new(db_path: impl AsRef<Path>) -> Result<Self> {
        Self::with_config(db_path, PoolConfig::default()).await
    }

    /// Creates a new SQLite course store with custom pool configuration.
    pub async fn with_config(db_path: impl AsRef<Path>, config: PoolConfig) -> Result<Self> {
        let db_path_str = db_path.as_ref().to_string_lossy().to_string();

        // Configure SQLite connection options for concurrent access
        let connect_options = SqliteConnectOptions::from_str(&format!("sqlite://{}", db_path_str))
            .map_err(|e| StorageError::Connection(e.to_string()))?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .create_if_missing(true);

        let pool = Self::build_pool(connect_options, &config).await?;

        let store = Self {
            pool,
            db_path: db_path_str,
        };

        store.initialize().await?;

        Ok(store)
    }

    /// Creates an in-memory SQLite course store.
    ///
    /// Uses a single connection so every query observes the same
    /// database; suitable for tests.
    pub async fn in_memory() -> Result<Self> {
        let mut config = PoolConfig::default();
        config.max_size = 1;
        config.min_idle = Some(0);

        let connect_options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| StorageError::Connection(e.to_string()))?
            .journal_mode(SqliteJournalMode::Memory)
            .synchronous(SqliteSynchronous::Normal);

        let pool = Self::build_pool(connect_options, &config).await?;

        let store = Self {
            pool,
            db_path: ":memory:".to_string(),
        };

        store.initialize().await?;

        Ok(store)
    }

    /// Builds the connection pool with the given configuration.
    async fn build_pool(
        connect_options: SqliteConnectOptions,
        config: &PoolConfig,
    ) -> Result<Pool<Sqlite>> {
        let mut builder = SqlitePoolOptions::new()
            .max_connections(config.max_size)
            .acquire_timeout(config.connection_timeout);

        if let Some(min_idle) = config.min_idle {
            builder = builder.min_connections(min_idle);
        }

        if let Some(max_lifetime) = config.max_lifetime {
            builder = builder.max_lifetime(max_lifetime);
        }

        if let Some(idle_timeout) = config.idle_timeout {
            builder = builder.idle_timeout(idle_timeout);
        }

        let pool = builder
            .connect_with(connect_options)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(pool)
    }

    /// Initialize the database schema and settings.
    async fn initialize(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS courses (
                id TEXT PRIMARY KEY,
                code TEXT NOT NULL,
                name TEXT NOT NULL,
                credits INTEGER NOT NULL DEFAULT 0,
                weekly_hours INTEGER NOT NULL DEFAULT 0,
                modality TEXT CHECK( modality IN ('IN_PERSON','ONLINE','HYBRID') ) NOT NULL,
                active INTEGER NOT NULL DEFAULT 1,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        // Codes and names are unique, case-insensitively
        sqlx::query(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_courses_code
             ON courses(code COLLATE NOCASE)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_courses_name
             ON courses(name COLLATE NOCASE)",
        )
        .execute(&self.pool)
        .await?;

        // Prerequisite edge set; position preserves attachment order
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS course_prerequisites (
                course_id TEXT NOT NULL,
                prerequisite_id TEXT NOT NULL,
                position INTEGER NOT NULL,
                PRIMARY KEY (course_id, prerequisite_id)
            )",
        )
        .execute(&self.pool)
        .await?;

        // Index for reverse lookups (which courses require X)
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_course_prerequisites_prereq
             ON course_prerequisites(prerequisite_id)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Returns the database path.
    pub fn db_path(&self) -> &str {
        &self.db_path
    }

    /// Returns the current pool size for monitoring.
    pub fn pool_size(&self) -> u32 {
        self.pool.size()
    }

    /// Returns the number of idle connections.
    pub fn idle_connections(&self) -> usize {
        self.pool.num_idle()
    }

    fn row_to_course(
        row: &sqlx::sqlite::SqliteRow,
        prerequisites: Vec<CourseId>,
    ) -> Result<Course> {
        let id_str: String = row.try_get("id")?;
        let id = CourseId::from_str(&id_str)
            .map_err(|e| StorageError::corrupt(format!("bad course id '{}': {}", id_str, e)))?;

        let code: String = row.try_get("code")?;
        let name: String = row.try_get("name")?;

        let credits: i64 = row.try_get("credits")?;
        let credits = u8::try_from(credits)
            .map_err(|_| StorageError::corrupt(format!("credits out of range: {}", credits)))?;

        let weekly_hours: i64 = row.try_get("weekly_hours")?;
        let weekly_hours = u16::try_from(weekly_hours).map_err(|_| {
            StorageError::corrupt(format!("weekly_hours out of range: {}", weekly_hours))
        })?;

        let modality_str: String = row.try_get("modality")?;
        let modality: Modality = modality_str
            .parse()
            .map_err(|e: String| StorageError::corrupt(e))?;

        let active: bool = row.try_get("active")?;

        let created_at_millis: i64 = row.try_get("created_at")?;
        let created_at =
            DateTime::from_timestamp_millis(created_at_millis).unwrap_or_else(Utc::now);
        let updated_at_millis: i64 = row.try_get("updated_at")?;
        let updated_at =
            DateTime::from_timestamp_millis(updated_at_millis).unwrap_or_else(Utc::now);

        Ok(Course::restore(
            id,
            code,
            name,
            credits,
            weekly_hours,
            modality,
            active,
            prerequisites,
            created_at,
            updated_at,
        ))
    }

    /// Loads the prerequisite ids of a single course, in attachment order.
    async fn load_prerequisites(&self, id: CourseId) -> Result<Vec<CourseId>> {
        let rows = sqlx::query(
            "SELECT prerequisite_id FROM course_prerequisites
             WHERE course_id = ?
             ORDER BY position",
        )
        .bind(id.to_string())
        .fetch_all(&self.pool)
        .await?;

        let mut prerequisites = Vec::with_capacity(rows.len());
        for row in rows {
            let prereq_str: String = row.try_get("prerequisite_id")?;
            let prereq = CourseId::from_str(&prereq_str).map_err(|e| {
                StorageError::corrupt(format!("bad prerequisite id '{}': {}", prereq_str, e))
            })?;
            prerequisites.push(prereq);
        }
        Ok(prerequisites)
    }

    /// Loads the whole edge table grouped by course, in attachment order.
    async fn load_all_prerequisites(&self) -> Result<HashMap<String, Vec<CourseId>>> {
        let rows = sqlx::query(
            "SELECT course_id, prerequisite_id FROM course_prerequisites
             ORDER BY course_id, position",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut by_course: HashMap<String, Vec<CourseId>> = HashMap::new();
        for row in rows {
            let course_id: String = row.try_get("course_id")?;
            let prereq_str: String = row.try_get("prerequisite_id")?;
            let prereq = CourseId::from_str(&prereq_str).map_err(|e| {
                StorageError::corrupt(format!("bad prerequisite id '{}': {}", prereq_str, e))
            })?;
            by_course.entry(course_id).or_default().push(prereq);
        }
        Ok(by_course)
    }

    async fn fetch_one_by(&self, column: &str, value: &str) -> Result<Option<Course>> {
        // column is one of our own identifiers, never caller input
        let query = format!(
            "SELECT id, code, name, credits, weekly_hours, modality, active, created_at, updated_at
             FROM courses WHERE {} = ? COLLATE NOCASE",
            column
        );
        let row = sqlx::query(&query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let id_str: String = row.try_get("id")?;
                let id = CourseId::from_str(&id_str).map_err(|e| {
                    StorageError::corrupt(format!("bad course id '{}': {}", id_str, e))
                })?;
                let prerequisites = self.load_prerequisites(id).await?;
                Ok(Some(Self::row_to_course(&row, prerequisites)?))
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl CourseStore for SqliteCourseStore {
    async fn find_by_id(&self, id: CourseId) -> Result<Option<Course>> {
        let row = sqlx::query(
            "SELECT id, code, name, credits, weekly_hours, modality, active, created_at, updated_at
             FROM courses WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let prerequisites = self.load_prerequisites(id).await?;
                Ok(Some(Self::row_to_course(&row, prerequisites)?))
            }
            None => Ok(None),
        }
    }

    async fn find_all(&self) -> Result<Vec<Course>> {
        let rows = sqlx::query(
            "SELECT id, code, name, credits, weekly_hours, modality, active, created_at, updated_at
             FROM courses ORDER BY rowid",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut by_course = self.load_all_prerequisites().await?;

        let mut courses = Vec::with_capacity(rows.len());
        for row in &rows {
            let id_str: String = row.try_get("id")?;
            let prerequisites = by_course.remove(&id_str).unwrap_or_default();
            courses.push(Self::row_to_course(row, prerequisites)?);
        }

        debug!("Loaded {} courses", courses.len());
        Ok(courses)
    }

    async fn save(&self, course: Course) -> Result<Course> {
        // Rewrite the course row and its edge rows atomically
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO courses (id, code, name, credits, weekly_hours, modality, active, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                 code = excluded.code,
                 name = excluded.name,
                 credits = excluded.credits,
                 weekly_hours = excluded.weekly_hours,
                 modality = excluded.modality,
                 active = excluded.active,
                 updated_at = excluded.updated_at",
        )
        .bind(course.id().to_string())
        .bind(course.code())
        .bind(course.name())
        .bind(course.credits() as i64)
        .bind(course.weekly_hours() as i64)
        .bind(course.modality().as_str())
        .bind(course.is_active())
        .bind(course.created_at().timestamp_millis())
        .bind(course.updated_at().timestamp_millis())
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM course_prerequisites WHERE course_id = ?")
            .bind(course.id().to_string())
            .execute(&mut *tx)
            .await?;

        for (position, prereq) in course.prerequisites().iter().enumerate() {
            sqlx::query(
                "INSERT INTO course_prerequisites (course_id, prerequisite_id, position)
                 VALUES (?, ?, ?)",
            )
            .bind(course.id().to_string())
            .bind(prereq.to_string())
            .bind(position as i64)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        debug!(
            "Saved course: id={}, code={}, prerequisites={}",
            course.id(),
            course.code(),
            course.prerequisites().len()
        );

        Ok(course)
    }

    async fn exists_by_id(&self, id: CourseId) -> Result<bool> {
        let row = sqlx::query("SELECT 1 FROM courses WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    async fn find_requiring(&self, prerequisite_id: CourseId) -> Result<Vec<Course>> {
        let rows = sqlx::query(
            "SELECT c.id, c.code, c.name, c.credits, c.weekly_hours, c.modality, c.active, c.created_at, c.updated_at
             FROM courses c
             JOIN course_prerequisites p ON p.course_id = c.id
             WHERE p.prerequisite_id = ?
             ORDER BY c.rowid",
        )
        .bind(prerequisite_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        let mut courses = Vec::with_capacity(rows.len());
        for row in &rows {
            let id_str: String = row.try_get("id")?;
            let id = CourseId::from_str(&id_str)
                .map_err(|e| StorageError::corrupt(format!("bad course id '{}': {}", id_str, e)))?;
            let prerequisites = self.load_prerequisites(id).await?;
            courses.push(Self::row_to_course(row, prerequisites)?);
        }
        Ok(courses)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Course>> {
        self.fetch_one_by("name", name).await
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Course>> {
        self.fetch_one_by("code", code).await
    }

    async fn delete_by_id(&self, id: CourseId) -> Result<bool> {
        // Remove the row and its outgoing edges atomically
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM courses WHERE id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM course_prerequisites WHERE course_id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        let removed = result.rows_affected() > 0;
        if removed {
            info!("Deleted course: id={}", id);
        }
        Ok(removed)
    }

    async fn count(&self) -> Result<u64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM courses")
            .fetch_one(&self.pool)
            .await?;
        let n: i64 = row.try_get("n")?;
        Ok(n as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CourseDraft;

    fn course(code: &str, name: &str) -> Course {
        Course::new(CourseDraft::new(code, name))
    }

    #[tokio::test]
    async fn test_save_and_find_roundtrip() {
        let store = SqliteCourseStore::in_memory().await.unwrap();

        let mut draft = CourseDraft::new("MATH101", "Calculus I");
        draft.credits = 6;
        draft.weekly_hours = 4;
        draft.modality = Modality::Hybrid;
        let c = Course::new(draft);
        let id = c.id();

        store.save(c).await.unwrap();

        let found = store.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(found.code(), "MATH101");
        assert_eq!(found.credits(), 6);
        assert_eq!(found.weekly_hours(), 4);
        assert_eq!(found.modality(), Modality::Hybrid);
        assert!(found.is_active());
    }

    #[tokio::test]
    async fn test_prerequisites_roundtrip_in_order() {
        let store = SqliteCourseStore::in_memory().await.unwrap();

        let a = course("A100", "Course A");
        let b = course("B100", "Course B");
        let (a_id, b_id) = (a.id(), b.id());
        store.save(a).await.unwrap();
        store.save(b).await.unwrap();

        let mut c = course("C200", "Course C");
        c.add_prerequisite(a_id);
        c.add_prerequisite(b_id);
        let c_id = c.id();
        store.save(c).await.unwrap();

        let found = store.find_by_id(c_id).await.unwrap().unwrap();
        assert_eq!(found.prerequisites(), &[a_id, b_id]);
    }

    #[tokio::test]
    async fn test_save_rewrites_edge_set() {
        let store = SqliteCourseStore::in_memory().await.unwrap();

        let a = course("A100", "Course A");
        let a_id = a.id();
        store.save(a).await.unwrap();

        let mut c = course("C200", "Course C");
        c.add_prerequisite(a_id);
        let c_id = c.id();
        store.save(c.clone()).await.unwrap();

        c.remove_prerequisite(&a_id);
        store.save(c).await.unwrap();

        let found = store.find_by_id(c_id).await.unwrap().unwrap();
        assert!(found.has_no_prerequisites());
        assert!(store.find_requiring(a_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_find_all_in_insertion_order() {
        let store = SqliteCourseStore::in_memory().await.unwrap();
        for code in ["CS101", "CS201", "CS301"] {
            store.save(course(code, code)).await.unwrap();
        }

        let all = store.find_all().await.unwrap();
        let listed: Vec<&str> = all.iter().map(|c| c.code()).collect();
        assert_eq!(listed, ["CS101", "CS201", "CS301"]);
    }

    #[tokio::test]
    async fn test_find_requiring() {
        let store = SqliteCourseStore::in_memory().await.unwrap();

        let base = course("MATH101", "Calculus I");
        let base_id = base.id();
        store.save(base).await.unwrap();

        let mut next = course("MATH201", "Calculus II");
        next.add_prerequisite(base_id);
        store.save(next).await.unwrap();

        store.save(course("ART100", "Drawing")).await.unwrap();

        let requiring = store.find_requiring(base_id).await.unwrap();
        assert_eq!(requiring.len(), 1);
        assert_eq!(requiring[0].code(), "MATH201");
    }

    #[tokio::test]
    async fn test_find_by_name_and_code_nocase() {
        let store = SqliteCourseStore::in_memory().await.unwrap();
        store.save(course("CS101", "Intro to Computing")).await.unwrap();

        assert!(store.find_by_name("INTRO to computing").await.unwrap().is_some());
        assert!(store.find_by_code("cs101").await.unwrap().is_some());
        assert!(store.find_by_name("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_removes_row_and_edges() {
        let store = SqliteCourseStore::in_memory().await.unwrap();

        let a = course("A100", "Course A");
        let a_id = a.id();
        store.save(a).await.unwrap();

        let mut c = course("C200", "Course C");
        c.add_prerequisite(a_id);
        let c_id = c.id();
        store.save(c).await.unwrap();

        assert!(store.delete_by_id(c_id).await.unwrap());
        assert!(!store.delete_by_id(c_id).await.unwrap());
        assert!(store.find_requiring(a_id).await.unwrap().is_empty());
        assert_eq!(store.count().await.unwrap(), 1);
    }
}
