//! # Record Mapper
//!
//! Generic CRUD over any `Record` type, composed from the schema's cached
//! statement templates.

use tracing::warn;

use super::errors::{OrmError, OrmResult, WriteOperation};
use super::pool::Database;
use super::record::Record;
use super::schema::{escape_ident, ModelSchema};
use super::value::Value;

/// Row limit for `find_all`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    /// `limit ?`
    Count(i64),
    /// `limit ?, ?` with offset first
    Window { offset: i64, count: i64 },
}

impl Limit {
    /// Interpret a loosely shaped limit: one value is a count, two values are
    /// `(offset, count)`. Anything else is rejected before any query runs.
    pub fn from_values(values: &[Value]) -> OrmResult<Self> {
        let ints: Option<Vec<i64>> = values.iter().map(Value::as_i64).collect();
        match ints.as_deref() {
            Some([count]) => Ok(Limit::Count(*count)),
            Some([offset, count]) => Ok(Limit::Window {
                offset: *offset,
                count: *count,
            }),
            _ => Err(OrmError::InvalidLimit(format!("{:?}", values))),
        }
    }

    /// Parse a JSON number or a two element array
    pub fn from_json(value: &serde_json::Value) -> OrmResult<Self> {
        let as_value = |v: &serde_json::Value| v.as_i64().map(Value::Integer).unwrap_or(Value::Null);
        match value {
            serde_json::Value::Array(items) => {
                Self::from_values(&items.iter().map(as_value).collect::<Vec<_>>())
            }
            serde_json::Value::Number(_) => Self::from_values(&[as_value(value)]),
            other => Err(OrmError::InvalidLimit(other.to_string())),
        }
    }
}

/// Optional clauses for `find_all`
#[derive(Debug, Clone, Default)]
pub struct FindOptions {
    filter: Option<String>,
    args: Vec<Value>,
    order_by: Option<String>,
    limit: Option<Limit>,
}

impl FindOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw `where` fragment with `?` placeholders and the values to bind
    pub fn filter(mut self, clause: impl Into<String>, args: Vec<Value>) -> Self {
        self.filter = Some(clause.into());
        self.args = args;
        self
    }

    /// Raw `order by` fragment, e.g. `created_at desc`
    pub fn order_by(mut self, clause: impl Into<String>) -> Self {
        self.order_by = Some(clause.into());
        self
    }

    pub fn limit(mut self, limit: Limit) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Compose the `find_all` statement and its argument list
pub fn find_all_sql(schema: &ModelSchema, options: &FindOptions) -> (String, Vec<Value>) {
    let mut sql = vec![schema.templates().select.clone()];
    let mut args = options.args.clone();
    if let Some(filter) = &options.filter {
        sql.push("where".to_string());
        sql.push(filter.clone());
    }
    if let Some(order_by) = &options.order_by {
        sql.push("order by".to_string());
        sql.push(order_by.clone());
    }
    match options.limit {
        Some(Limit::Count(count)) => {
            sql.push("limit ?".to_string());
            args.push(Value::Integer(count));
        }
        Some(Limit::Window { offset, count }) => {
            sql.push("limit ?, ?".to_string());
            args.push(Value::Integer(offset));
            args.push(Value::Integer(count));
        }
        None => {}
    }
    (sql.join(" "), args)
}

/// Compose the `find_number` statement
pub fn find_number_sql(schema: &ModelSchema, select: &str, filter: Option<&str>) -> String {
    let mut sql = format!("select {} as _num_ from {}", select, escape_ident(schema.table()));
    if let Some(filter) = filter {
        sql.push_str(" where ");
        sql.push_str(filter);
    }
    sql
}

impl Database {
    /// Look a record up by primary key
    pub async fn find<R: Record>(&self, pk: impl Into<Value>) -> OrmResult<Option<R>> {
        let schema = R::schema();
        let sql = format!(
            "{} where {}=?",
            schema.templates().select,
            escape_ident(schema.column(schema.primary_key()).unwrap_or(schema.primary_key()))
        );
        let mut rows = self.select(&sql, &[pk.into()], Some(1)).await?;
        match rows.pop() {
            Some(row) => Ok(Some(R::from_row(row)?)),
            None => Ok(None),
        }
    }

    /// Records matching `options`, in result order
    pub async fn find_all<R: Record>(&self, options: FindOptions) -> OrmResult<Vec<R>> {
        let (sql, args) = find_all_sql(R::schema(), &options);
        let rows = self.select(&sql, &args, None).await?;
        rows.into_iter().map(R::from_row).collect()
    }

    /// Single aggregate, e.g. `count(id)`; `None` when no row comes back
    pub async fn find_number<R: Record>(
        &self,
        select: &str,
        filter: Option<&str>,
        args: Vec<Value>,
    ) -> OrmResult<Option<Value>> {
        let sql = find_number_sql(R::schema(), select, filter);
        let mut rows = self.select(&sql, &args, Some(1)).await?;
        Ok(rows.pop().and_then(|row| row.get("_num_").cloned()))
    }

    /// Insert `record`, filling unset attributes (primary key included) from
    /// their defaults first. Resolved defaults stay on the record.
    pub async fn save<R: Record>(&self, record: &mut R) -> OrmResult<()> {
        let schema = R::schema();
        let mut args = Vec::with_capacity(schema.fields().len() + 1);
        for field in schema.fields() {
            args.push(record.value_or_default(field)?);
        }
        args.push(record.value_or_default(schema.primary_key())?);
        let rows = self.execute(&schema.templates().insert, &args).await?;
        self.check_write(WriteOperation::Insert, schema, rows)
    }

    /// Write every attribute back by primary key. Defaults are not applied.
    pub async fn update<R: Record>(&self, record: &R) -> OrmResult<()> {
        let schema = R::schema();
        let mut args: Vec<Value> = schema.fields().iter().map(|f| record.value(f)).collect();
        args.push(record.primary_key_value());
        let rows = self.execute(&schema.templates().update, &args).await?;
        self.check_write(WriteOperation::Update, schema, rows)
    }

    /// Delete by primary key
    pub async fn remove<R: Record>(&self, record: &R) -> OrmResult<()> {
        let schema = R::schema();
        let args = [record.primary_key_value()];
        let rows = self.execute(&schema.templates().delete, &args).await?;
        self.check_write(WriteOperation::Delete, schema, rows)
    }

    fn check_write(&self, operation: WriteOperation, schema: &ModelSchema, affected: u64) -> OrmResult<()> {
        if affected == 1 {
            return Ok(());
        }
        warn!(
            table = schema.table(),
            %operation,
            affected,
            "write did not affect exactly one row"
        );
        if self.strict_writes() {
            return Err(OrmError::Write {
                operation,
                table: schema.table().to_string(),
                affected,
            });
        }
        Ok(())
    }
}
