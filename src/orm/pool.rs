//! # Connection Pool
//!
//! `Database` wraps the sqlx pool and runs single statements on a borrowed
//! connection. Every statement takes `?` placeholders and a separate argument
//! list; values are bound by the driver and never spliced into SQL text.
//!
//! There is no locking primitive. Two tasks updating the same primary key
//! race at the storage layer and the last write wins.

use std::time::Duration;

use futures_util::{StreamExt, TryStreamExt};
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Column, Row as _, Sqlite, TypeInfo, ValueRef};
use tracing::{info, warn};

use super::config::DbConfig;
use super::errors::{OrmError, OrmResult};
use super::schema::ModelSchema;
use super::value::{Row, Value};

/// Shared handle to the connection pool.
///
/// Cheap to clone; clones share the same pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
    autocommit: bool,
    strict_writes: bool,
}

impl Database {
    /// Open the pool described by `config`
    pub async fn connect(config: &DbConfig) -> OrmResult<Self> {
        let (max, min) = if config.is_in_memory() {
            // every connection would open its own empty database
            (1, 1)
        } else {
            (config.max_connections, config.min_connections)
        };
        info!(url = %config.url, max_connections = max, "create database connection pool");
        let mut options = SqlitePoolOptions::new()
            .max_connections(max)
            .min_connections(min)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs));
        if config.is_in_memory() {
            // dropping the last connection drops the database
            options = options.idle_timeout(None).max_lifetime(None);
        }
        let pool = options.connect(&config.url).await?;
        Ok(Self::from_pool(pool, config))
    }

    /// Wrap an existing pool
    pub fn from_pool(pool: SqlitePool, config: &DbConfig) -> Self {
        Self {
            pool,
            autocommit: config.autocommit,
            strict_writes: config.strict_writes,
        }
    }

    /// Fresh in-memory database with default write policy
    pub async fn in_memory() -> OrmResult<Self> {
        Self::connect(&DbConfig::in_memory()).await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn autocommit(&self) -> bool {
        self.autocommit
    }

    pub fn strict_writes(&self) -> bool {
        self.strict_writes
    }

    /// Builder-style override of the write policy
    pub fn with_strict_writes(mut self, strict: bool) -> Self {
        self.strict_writes = strict;
        self
    }

    /// Run a query and return at most `size` rows (all rows when `None`)
    pub async fn select(&self, sql: &str, args: &[Value], size: Option<usize>) -> OrmResult<Vec<Row>> {
        info!(sql, ?args, "sql");
        let mut conn = self.pool.acquire().await?;
        let stream = bind_args(sqlx::query(sql), args).fetch(&mut *conn);
        let rows: Vec<SqliteRow> = match size {
            Some(size) => stream.take(size).try_collect().await?,
            None => stream.try_collect().await?,
        };
        info!(rows = rows.len(), "rows returned");
        rows.iter().map(decode_row).collect()
    }

    /// Run an insert/update/delete with the pool's autocommit default
    pub async fn execute(&self, sql: &str, args: &[Value]) -> OrmResult<u64> {
        self.execute_with(sql, args, self.autocommit).await
    }

    /// Run an insert/update/delete and return the affected row count.
    ///
    /// Without autocommit the statement runs inside a transaction that is
    /// committed on success and rolled back before any error is returned.
    pub async fn execute_with(&self, sql: &str, args: &[Value], autocommit: bool) -> OrmResult<u64> {
        info!(sql, ?args, autocommit, "sql");
        if autocommit {
            let mut conn = self.pool.acquire().await?;
            let result = bind_args(sqlx::query(sql), args).execute(&mut *conn).await?;
            return Ok(result.rows_affected());
        }

        let mut tx = self.pool.begin().await?;
        match bind_args(sqlx::query(sql), args).execute(&mut *tx).await {
            Ok(result) => {
                tx.commit().await?;
                Ok(result.rows_affected())
            }
            Err(e) => {
                if let Err(rollback) = tx.rollback().await {
                    warn!(error = %rollback, "rollback failed");
                }
                Err(OrmError::Database(e))
            }
        }
    }

    /// Create the tables for `schemas` if they do not exist
    pub async fn create_tables(&self, schemas: &[&ModelSchema]) -> OrmResult<()> {
        for schema in schemas {
            self.execute_with(&schema.create_table_sql(), &[], true).await?;
        }
        Ok(())
    }

    /// Close every pooled connection
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn bind_args<'q>(
    mut query: Query<'q, Sqlite, SqliteArguments<'q>>,
    args: &[Value],
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    for arg in args {
        query = match arg {
            Value::Null => query.bind(Option::<String>::None),
            Value::Bool(v) => query.bind(*v),
            Value::Integer(v) => query.bind(*v),
            Value::Float(v) => query.bind(*v),
            Value::Text(v) => query.bind(v.clone()),
        };
    }
    query
}

fn decode_row(row: &SqliteRow) -> OrmResult<Row> {
    let mut columns = Vec::with_capacity(row.columns().len());
    for column in row.columns() {
        let index = column.ordinal();
        let raw = row.try_get_raw(index)?;
        let value = if raw.is_null() {
            Value::Null
        } else {
            let type_name = raw.type_info().name().to_string();
            match type_name.as_str() {
                "INTEGER" | "BIGINT" | "INT8" | "BOOLEAN" => {
                    Value::Integer(row.try_get_unchecked::<i64, _>(index)?)
                }
                "REAL" | "NUMERIC" => Value::Float(row.try_get_unchecked::<f64, _>(index)?),
                "TEXT" | "DATE" | "TIME" | "DATETIME" => {
                    Value::Text(row.try_get_unchecked::<String, _>(index)?)
                }
                _ => {
                    return Err(OrmError::UnsupportedColumn {
                        column: column.name().to_string(),
                        type_name,
                    })
                }
            }
        };
        columns.push((column.name().to_string(), value));
    }
    Ok(Row::new(columns))
}
