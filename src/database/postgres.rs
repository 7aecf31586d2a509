use std::sync::Arc;

use async_trait::async_trait;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{Postgres, Row};

use super::manager::DatabaseManager;
use super::partition::Partition;
use super::store::{CredentialStore, RecordStore, StoreError};
use super::tables::{FilterClause, PgResource, SqlValue};
use crate::models::{RecordId, Stored, UserRecord};

type PgQuery<'q> = Query<'q, Postgres, PgArguments>;

fn bind_value(query: PgQuery<'_>, value: SqlValue) -> PgQuery<'_> {
    match value {
        SqlValue::Text(v) => query.bind(v),
        SqlValue::Decimal(v) => query.bind(v),
        SqlValue::Date(v) => query.bind(v),
        SqlValue::OptionalDate(v) => query.bind(v),
        SqlValue::Bool(v) => query.bind(v),
    }
}

fn bind_all(query: PgQuery<'_>, values: Vec<SqlValue>) -> PgQuery<'_> {
    values.into_iter().fold(query, bind_value)
}

/// Unique index violations (SQLSTATE 23505) become [`StoreError::UniqueViolation`].
fn map_write_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        if db.code().as_deref() == Some("23505") {
            return StoreError::UniqueViolation;
        }
    }
    StoreError::Sqlx(err)
}

fn qualified_table<R: PgResource>(partition: &Partition) -> String {
    format!("\"{}\".{}", partition.name(), R::COLLECTION)
}

fn stored_from_row<R: PgResource>(row: &PgRow) -> Result<Stored<R>, StoreError> {
    let raw: String = row.try_get("id")?;
    let id = RecordId::parse(&raw).map_err(|e| StoreError::Corrupt(e.to_string()))?;
    Ok(Stored::new(id, R::from_row(row)?))
}

/// Postgres-backed store; one schema per user partition.
#[derive(Clone)]
pub struct PgStore {
    manager: Arc<DatabaseManager>,
}

impl PgStore {
    pub fn new(manager: Arc<DatabaseManager>) -> Self {
        Self { manager }
    }

    pub fn manager(&self) -> &DatabaseManager {
        &self.manager
    }

    /// Creates a partition's schema and tables without waiting for a request.
    pub async fn ensure_partition(&self, partition: &Partition) -> Result<(), StoreError> {
        self.manager.partition_pool(partition).await.map(|_| ())
    }
}

#[async_trait]
impl<R: PgResource> RecordStore<R> for PgStore {
    async fn list(&self, partition: &Partition, filter: &R::Filter) -> Result<Vec<Stored<R>>, StoreError> {
        let pool = self.manager.partition_pool(partition).await?;
        let columns = R::COLUMNS.join(", ");
        let table = qualified_table::<R>(partition);

        let (condition, binds) = match R::filter_clause(filter) {
            FilterClause::All => (String::new(), Vec::new()),
            FilterClause::Equals(column, value) => (format!(" WHERE {column} = $1"), vec![value]),
            FilterClause::Nothing => (" WHERE FALSE".to_string(), Vec::new()),
        };
        let sql = format!(
            "SELECT id, {columns} FROM {table}{condition} ORDER BY {}",
            R::ORDER_BY
        );

        let rows = bind_all(sqlx::query(&sql), binds).fetch_all(&pool).await?;
        rows.iter().map(stored_from_row::<R>).collect()
    }

    async fn find_conflict(
        &self,
        partition: &Partition,
        record: &R,
        exclude: Option<&RecordId>,
    ) -> Result<bool, StoreError> {
        let pool = self.manager.partition_pool(partition).await?;
        let mut conditions: Vec<String> = R::NATURAL_KEY
            .iter()
            .enumerate()
            .map(|(i, column)| format!("{column} = ${}", i + 1))
            .collect();
        let mut binds = record.natural_key();
        if let Some(id) = exclude {
            conditions.push(format!("id <> ${}", binds.len() + 1));
            binds.push(SqlValue::Text(id.to_string()));
        }

        let sql = format!(
            "SELECT EXISTS (SELECT 1 FROM {} WHERE {}) AS taken",
            qualified_table::<R>(partition),
            conditions.join(" AND ")
        );
        let row = bind_all(sqlx::query(&sql), binds).fetch_one(&pool).await?;
        Ok(row.try_get::<bool, _>("taken")?)
    }

    async fn insert(&self, partition: &Partition, record: R) -> Result<Stored<R>, StoreError> {
        let pool = self.manager.partition_pool(partition).await?;
        let id = RecordId::generate();
        let placeholders: Vec<String> = (1..=R::COLUMNS.len() + 1).map(|i| format!("${i}")).collect();
        let sql = format!(
            "INSERT INTO {} (id, {}) VALUES ({})",
            qualified_table::<R>(partition),
            R::COLUMNS.join(", "),
            placeholders.join(", ")
        );

        let query = sqlx::query(&sql).bind(id.to_string());
        bind_all(query, record.values())
            .execute(&pool)
            .await
            .map_err(map_write_error)?;

        Ok(Stored::new(id, record))
    }

    async fn update(&self, partition: &Partition, id: &RecordId, record: R) -> Result<bool, StoreError> {
        let pool = self.manager.partition_pool(partition).await?;
        let assignments: Vec<String> = R::COLUMNS
            .iter()
            .enumerate()
            .map(|(i, column)| format!("{column} = ${}", i + 1))
            .collect();
        let sql = format!(
            "UPDATE {} SET {} WHERE id = ${}",
            qualified_table::<R>(partition),
            assignments.join(", "),
            R::COLUMNS.len() + 1
        );

        let result = bind_all(sqlx::query(&sql), record.values())
            .bind(id.to_string())
            .execute(&pool)
            .await
            .map_err(map_write_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, partition: &Partition, id: &RecordId) -> Result<bool, StoreError> {
        let pool = self.manager.partition_pool(partition).await?;
        let sql = format!("DELETE FROM {} WHERE id = $1", qualified_table::<R>(partition));
        let result = sqlx::query(&sql).bind(id.to_string()).execute(&pool).await?;
        Ok(result.rows_affected() > 0)
    }
}

fn user_from_row(row: &PgRow) -> Result<UserRecord, sqlx::Error> {
    Ok(UserRecord {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        name: row.try_get("name")?,
        password_hash: row.try_get("password_hash")?,
    })
}

#[async_trait]
impl CredentialStore for PgStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let pool = self.manager.global_pool().await?;
        let row = sqlx::query("SELECT id, email, name, password_hash FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&pool)
            .await?;
        Ok(row.as_ref().map(user_from_row).transpose()?)
    }

    async fn insert_user(&self, user: UserRecord) -> Result<(), StoreError> {
        let pool = self.manager.global_pool().await?;
        sqlx::query("INSERT INTO users (id, email, name, password_hash) VALUES ($1, $2, $3, $4)")
            .bind(user.id)
            .bind(user.email)
            .bind(user.name)
            .bind(user.password_hash)
            .execute(&pool)
            .await
            .map_err(map_write_error)?;
        Ok(())
    }

    async fn list_users(&self) -> Result<Vec<UserRecord>, StoreError> {
        let pool = self.manager.global_pool().await?;
        let rows = sqlx::query("SELECT id, email, name, password_hash FROM users ORDER BY email COLLATE \"C\"")
            .fetch_all(&pool)
            .await?;
        Ok(rows.iter().map(user_from_row).collect::<Result<_, _>>()?)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.manager.health_check().await
    }
}
