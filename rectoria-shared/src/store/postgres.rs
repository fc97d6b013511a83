/// PostgreSQL store
///
/// Statements are generated from the entity definitions. Every statement
/// returns rows as `to_jsonb(t)` so snapshots come back as JSON objects keyed
/// by column name, whatever the kind. Identifiers are always quoted because
/// table and column names are mixed case.
///
/// Values are bound as text, bigint or boolean and cast in SQL to the column
/// type, which keeps binding independent of the kind being written.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::PgPool;
use tracing::{debug, warn};

use super::Store;
use crate::db::pool::health_check;
use crate::error::{ConstraintViolation, EntityError, FieldViolation};
use crate::models::{EntityDef, EntityKind, FieldType, Filter, Record, UPDATED_AT};

/// Store backed by a PostgreSQL pool
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn fetch_optional(&self, kind: EntityKind, statement: Statement) -> Result<Option<Record>, EntityError> {
        debug!(kind = %kind, sql = %statement.sql, "Executing statement");
        let row = bind_all(sqlx::query_scalar::<_, Value>(&statement.sql), statement.binds)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(kind, e))?;

        row.map(into_record).transpose()
    }
}

#[async_trait]
impl Store for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn find_by_pk(&self, kind: EntityKind, id: i64) -> Result<Option<Record>, EntityError> {
        self.fetch_optional(kind, select_by_pk(kind.def(), id)).await
    }

    async fn find_all(&self, kind: EntityKind, filter: &Filter) -> Result<Vec<Record>, EntityError> {
        let statement = select_all(kind.def(), filter);
        debug!(kind = %kind, sql = %statement.sql, "Executing statement");

        let rows = bind_all(sqlx::query_scalar::<_, Value>(&statement.sql), statement.binds)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(kind, e))?;

        rows.into_iter().map(into_record).collect()
    }

    async fn insert(&self, kind: EntityKind, values: Record) -> Result<Record, EntityError> {
        self.fetch_optional(kind, insert(kind.def(), &values))
            .await?
            .ok_or_else(|| EntityError::Storage(format!("INSERT into {kind} returned no row")))
    }

    async fn update(
        &self,
        kind: EntityKind,
        id: i64,
        changes: Record,
    ) -> Result<Option<Record>, EntityError> {
        self.fetch_optional(kind, update(kind.def(), id, &changes)).await
    }

    async fn delete(&self, kind: EntityKind, id: i64) -> Result<bool, EntityError> {
        let def = kind.def();
        let sql = format!(
            r#"DELETE FROM "{table}" AS t WHERE t."{pk}" = $1 RETURNING t."{pk}""#,
            table = def.table(),
            pk = def.primary_key,
        );

        let deleted = sqlx::query_scalar::<_, i64>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(kind, e))?;

        Ok(deleted.is_some())
    }

    async fn ping(&self) -> Result<(), EntityError> {
        health_check(&self.pool)
            .await
            .map_err(|e| EntityError::Storage(e.to_string()))
    }
}

/// Parameter bound to a generated statement
#[derive(Debug, Clone, PartialEq)]
enum Bind {
    Int(Option<i64>),
    Bool(Option<bool>),
    Text(Option<String>),
}

impl Bind {
    fn new(ty: &FieldType, value: &Value) -> Self {
        match ty {
            FieldType::Integer => Bind::Int(value.as_i64()),
            FieldType::Boolean => Bind::Bool(value.as_bool()),
            _ => Bind::Text(value.as_str().map(str::to_string)),
        }
    }
}

#[derive(Debug)]
struct Statement {
    sql: String,
    binds: Vec<Bind>,
}

fn cast(ty: &FieldType) -> &'static str {
    match ty {
        FieldType::Integer => "bigint",
        FieldType::Boolean => "boolean",
        FieldType::Time => "time",
        FieldType::DateTime => "timestamptz",
        FieldType::String { .. } | FieldType::Text | FieldType::Enum(_) => "text",
    }
}

fn select_by_pk(def: &EntityDef, id: i64) -> Statement {
    Statement {
        sql: format!(
            r#"SELECT to_jsonb(t) FROM "{}" AS t WHERE t."{}" = $1"#,
            def.table(),
            def.primary_key
        ),
        binds: vec![Bind::Int(Some(id))],
    }
}

fn select_all(def: &EntityDef, filter: &Filter) -> Statement {
    let mut conditions = Vec::new();
    let mut binds = Vec::new();

    for (column, value) in filter.iter() {
        if value.is_null() {
            conditions.push(format!(r#"t."{column}" IS NULL"#));
            continue;
        }

        // Filters are validated against the definition before they get here.
        let ty = def.column_type(column).unwrap_or(&FieldType::Text);
        binds.push(Bind::new(ty, value));
        conditions.push(format!(r#"t."{column}" = ${}::{}"#, binds.len(), cast(ty)));
    }

    let mut sql = format!(r#"SELECT to_jsonb(t) FROM "{}" AS t"#, def.table());
    if !conditions.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&conditions.join(" AND "));
    }
    sql.push_str(&format!(r#" ORDER BY t."{}""#, def.primary_key));

    Statement { sql, binds }
}

fn insert(def: &EntityDef, values: &Record) -> Statement {
    let mut columns = Vec::new();
    let mut placeholders = Vec::new();
    let mut binds = Vec::new();

    for field in def.fields {
        let Some(value) = values.get(field.name) else {
            continue;
        };
        binds.push(Bind::new(&field.ty, value));
        columns.push(format!(r#""{}""#, field.name));
        placeholders.push(format!("${}::{}", binds.len(), cast(&field.ty)));
    }

    let sql = if columns.is_empty() {
        format!(
            r#"INSERT INTO "{}" AS t DEFAULT VALUES RETURNING to_jsonb(t)"#,
            def.table()
        )
    } else {
        format!(
            r#"INSERT INTO "{}" AS t ({}) VALUES ({}) RETURNING to_jsonb(t)"#,
            def.table(),
            columns.join(", "),
            placeholders.join(", ")
        )
    };

    Statement { sql, binds }
}

fn update(def: &EntityDef, id: i64, changes: &Record) -> Statement {
    let mut assignments = Vec::new();
    let mut binds = Vec::new();

    for field in def.fields {
        let Some(value) = changes.get(field.name) else {
            continue;
        };
        binds.push(Bind::new(&field.ty, value));
        assignments.push(format!(r#""{}" = ${}::{}"#, field.name, binds.len(), cast(&field.ty)));
    }
    assignments.push(format!(r#""{UPDATED_AT}" = NOW()"#));

    binds.push(Bind::Int(Some(id)));
    let sql = format!(
        r#"UPDATE "{}" AS t SET {} WHERE t."{}" = ${} RETURNING to_jsonb(t)"#,
        def.table(),
        assignments.join(", "),
        def.primary_key,
        binds.len()
    );

    Statement { sql, binds }
}

fn bind_all<'q>(
    mut query: sqlx::query::QueryScalar<'q, sqlx::Postgres, Value, sqlx::postgres::PgArguments>,
    binds: Vec<Bind>,
) -> sqlx::query::QueryScalar<'q, sqlx::Postgres, Value, sqlx::postgres::PgArguments> {
    for bind in binds {
        query = match bind {
            Bind::Int(value) => query.bind(value),
            Bind::Bool(value) => query.bind(value),
            Bind::Text(value) => query.bind(value),
        };
    }
    query
}

fn into_record(value: Value) -> Result<Record, EntityError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(EntityError::Storage(format!(
            "expected a row object, got {other}"
        ))),
    }
}

/// Maps a driver error onto the entity error taxonomy using its SQLSTATE
fn map_sqlx_error(kind: EntityKind, err: sqlx::Error) -> EntityError {
    let sqlx::Error::Database(db_err) = &err else {
        warn!(kind = %kind, error = %err, "Database operation failed");
        return EntityError::Storage(err.to_string());
    };

    let code = db_err.code().map(|code| code.into_owned()).unwrap_or_default();
    let message = db_err.message().to_string();

    match code.as_str() {
        // unique_violation
        "23505" => {
            let field = db_err
                .constraint()
                .and_then(|constraint| unique_column(kind, constraint));
            match field {
                Some(field) => ConstraintViolation::Unique {
                    entity: kind,
                    field: field.to_string(),
                }
                .into(),
                None => ConstraintViolation::Database(message).into(),
            }
        }
        // foreign_key_violation
        "23503" => ConstraintViolation::Database(message).into(),
        // not_null_violation, check_violation, data exceptions
        "23502" | "23514" => EntityError::ValidationFailed(vec![FieldViolation::Rejected(message)]),
        data if data.starts_with("22") => {
            EntityError::ValidationFailed(vec![FieldViolation::Rejected(message)])
        }
        _ => {
            warn!(kind = %kind, code = %code, error = %message, "Database operation failed");
            EntityError::Storage(message)
        }
    }
}

/// Column named by a default unique constraint (`{table}_{column}_key`)
fn unique_column(kind: EntityKind, constraint: &str) -> Option<&'static str> {
    let column = constraint
        .strip_prefix(kind.name())?
        .strip_prefix('_')?
        .strip_suffix("_key")?;

    kind.def().field(column).map(|field| field.name)
}
