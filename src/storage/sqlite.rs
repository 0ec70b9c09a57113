//! SQLite-backed store for the `teachers` and `reviews` tables.
//!
//! The store owns identifier assignment and referential linkage only; the average-rating
//! rule lives in the service. Multi-step writes go through [`StoreTx`].
//!
//! Write transactions are handed out from a dedicated single-connection pool, so writers in
//! this process queue for that connection instead of racing for SQLite's write lock. Reads
//! use a separate pool; with WAL journaling they never block the writer.

use crate::domain::model::{Review, Teacher, TeacherWithReviews};
use crate::storage::error::{StoreError, StoreResultExt};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, Sqlite, SqlitePool, Transaction};
use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};

const TEACHER_COLUMNS: &str = "id, name, description, avgRating, createdAt";

/// Handle to the database. Cheap to clone; all clones share the same pools.
#[derive(Clone, Debug)]
pub struct Store {
    pool: SqlitePool,
    writer: SqlitePool,
}

impl Store {
    /// Opens (and creates if missing) the database at `url`, e.g. `sqlite://teachers.db`.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)
            .store_context("invalid database url")?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));
        let writer = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options.clone())
            .await
            .store_context("failed to open sqlite database")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .store_context("failed to open sqlite database")?;
        info!(%url, "connected to sqlite database");
        Ok(Self { pool, writer })
    }

    /// A private in-memory database. Backed by a single long-lived connection, since each
    /// SQLite memory connection is its own database.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .store_context("invalid database url")?
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .store_context("failed to open in-memory database")?;
        Ok(Self {
            writer: pool.clone(),
            pool,
        })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Creates both tables and their indexes if they do not exist yet. Safe on every start.
    pub async fn init_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS teachers (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                description TEXT NOT NULL,
                avgRating REAL NOT NULL DEFAULT 0,
                createdAt DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .store_context("failed to create teachers table")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS reviews (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                teacherId INTEGER NOT NULL REFERENCES teachers(id),
                rating INTEGER NOT NULL,
                reason TEXT NOT NULL,
                date TEXT NOT NULL,
                createdAt DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .store_context("failed to create reviews table")?;

        // Databases written before the index existed may already hold case-duplicate names;
        // the lookup in the service still guards new inserts there.
        let index = sqlx::query(
            "CREATE UNIQUE INDEX IF NOT EXISTS teachers_name_nocase ON teachers (name COLLATE NOCASE)",
        )
        .execute(&self.pool)
        .await
        .store_context("failed to create teacher name index");
        match index {
            Ok(_) => {}
            Err(e) if e.is_unique_violation() => {
                warn!(error = %e, "existing teachers share a name; skipping unique name index");
            }
            Err(e) => return Err(e),
        }

        sqlx::query("CREATE INDEX IF NOT EXISTS reviews_teacher_id ON reviews (teacherId)")
            .execute(&self.pool)
            .await
            .store_context("failed to create review index")?;

        info!("database schema ready");
        Ok(())
    }

    /// Starts a write transaction. Dropping the returned handle without committing rolls back.
    pub async fn begin(&self) -> Result<StoreTx, StoreError> {
        let tx = self
            .writer
            .begin()
            .await
            .store_context("failed to begin transaction")?;
        Ok(StoreTx { tx })
    }

    /// Every teacher with its reviews, ordered by `avgRating` descending, ties by insertion.
    pub async fn list_teachers_with_reviews(&self) -> Result<Vec<TeacherWithReviews>, StoreError> {
        let teachers = sqlx::query(&format!(
            "SELECT {TEACHER_COLUMNS} FROM teachers ORDER BY avgRating DESC, id ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .store_context("failed to list teachers")?
        .iter()
        .map(teacher_from_row)
        .collect::<Result<Vec<_>, _>>()
        .store_context("failed to decode teacher")?;

        let reviews = sqlx::query(
            "SELECT id, teacherId, CAST(rating AS INTEGER) AS rating, reason, date, createdAt \
             FROM reviews WHERE teacherId IS NOT NULL ORDER BY teacherId, id",
        )
        .fetch_all(&self.pool)
        .await
        .store_context("failed to list reviews")?
        .iter()
        .map(review_from_row)
        .collect::<Result<Vec<_>, _>>()
        .store_context("failed to decode review")?;

        let mut by_teacher: HashMap<i64, Vec<Review>> = HashMap::new();
        for review in reviews {
            by_teacher.entry(review.teacher_id).or_default().push(review);
        }

        let rows = teachers
            .into_iter()
            .map(|teacher| {
                let reviews = by_teacher.remove(&teacher.id).unwrap_or_default();
                TeacherWithReviews {
                    review_count: reviews.len(),
                    teacher,
                    reviews,
                }
            })
            .collect::<Vec<_>>();
        debug!(count = rows.len(), "listed teachers");
        Ok(rows)
    }

    pub async fn count_teachers(&self) -> Result<i64, StoreError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM teachers")
            .fetch_one(&self.pool)
            .await
            .store_context("failed to count teachers")
    }

    pub async fn count_reviews(&self) -> Result<i64, StoreError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM reviews")
            .fetch_one(&self.pool)
            .await
            .store_context("failed to count reviews")
    }

    /// Closes every pooled connection. Call once at shutdown.
    pub async fn close(&self) {
        self.writer.close().await;
        self.pool.close().await;
        info!("database connections closed");
    }
}

/// A store transaction: the unit the service uses for multi-step writes.
pub struct StoreTx {
    tx: Transaction<'static, Sqlite>,
}

impl StoreTx {
    /// Case-insensitive exact match on the teacher's name.
    pub async fn find_teacher_by_name(&mut self, name: &str) -> Result<Option<Teacher>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {TEACHER_COLUMNS} FROM teachers WHERE LOWER(name) = LOWER(?) LIMIT 1"
        ))
        .bind(name)
        .fetch_optional(&mut *self.tx)
        .await
        .store_context("failed to look up teacher by name")?;
        row.as_ref()
            .map(teacher_from_row)
            .transpose()
            .store_context("failed to decode teacher")
    }

    pub async fn find_teacher_by_id(&mut self, id: i64) -> Result<Option<Teacher>, StoreError> {
        let row = sqlx::query(&format!("SELECT {TEACHER_COLUMNS} FROM teachers WHERE id = ?"))
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await
            .store_context("failed to look up teacher by id")?;
        row.as_ref()
            .map(teacher_from_row)
            .transpose()
            .store_context("failed to decode teacher")
    }

    /// Inserts a teacher with a provisional `avgRating`; returns the new id.
    pub async fn insert_teacher(
        &mut self,
        name: &str,
        description: &str,
        initial_rating: f64,
    ) -> Result<i64, StoreError> {
        let result =
            sqlx::query("INSERT INTO teachers (name, description, avgRating) VALUES (?, ?, ?)")
                .bind(name)
                .bind(description)
                .bind(initial_rating)
                .execute(&mut *self.tx)
                .await
                .store_context("failed to insert teacher")?;
        Ok(result.last_insert_rowid())
    }

    /// Inserts a review row; leaves the teacher's `avgRating` untouched.
    pub async fn insert_review(
        &mut self,
        teacher_id: i64,
        rating: i64,
        reason: &str,
        date: &str,
    ) -> Result<i64, StoreError> {
        let result =
            sqlx::query("INSERT INTO reviews (teacherId, rating, reason, date) VALUES (?, ?, ?, ?)")
                .bind(teacher_id)
                .bind(rating)
                .bind(reason)
                .bind(date)
                .execute(&mut *self.tx)
                .await
                .store_context("failed to insert review")?;
        Ok(result.last_insert_rowid())
    }

    /// Mean rating over the teacher's reviews, or `None` when there are none.
    pub async fn average_rating(&mut self, teacher_id: i64) -> Result<Option<f64>, StoreError> {
        sqlx::query_scalar::<_, Option<f64>>(
            "SELECT AVG(CAST(rating AS REAL)) FROM reviews WHERE teacherId = ?",
        )
        .bind(teacher_id)
        .fetch_one(&mut *self.tx)
        .await
        .store_context("failed to compute average rating")
    }

    pub async fn update_teacher_avg_rating(
        &mut self,
        teacher_id: i64,
        new_avg: f64,
    ) -> Result<(), StoreError> {
        sqlx::query("UPDATE teachers SET avgRating = ? WHERE id = ?")
            .bind(new_avg)
            .bind(teacher_id)
            .execute(&mut *self.tx)
            .await
            .store_context("failed to update average rating")?;
        Ok(())
    }

    pub async fn commit(self) -> Result<(), StoreError> {
        self.tx
            .commit()
            .await
            .store_context("failed to commit transaction")
    }
}

fn teacher_from_row(row: &SqliteRow) -> Result<Teacher, sqlx::Error> {
    Ok(Teacher {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        avg_rating: row.try_get("avgRating")?,
        created_at: row.try_get("createdAt")?,
    })
}

fn review_from_row(row: &SqliteRow) -> Result<Review, sqlx::Error> {
    Ok(Review {
        id: row.try_get("id")?,
        teacher_id: row.try_get("teacherId")?,
        rating: row.try_get("rating")?,
        reason: row.try_get("reason")?,
        date: row.try_get("date")?,
        created_at: row.try_get("createdAt")?,
    })
}
