/// Schema synchronization
///
/// Creates one table per registered kind when it does not exist yet. Tables
/// are created in dependency order so foreign keys always point at an
/// existing table. Existing tables are left untouched.
///
/// Foreign keys on nullable columns use `ON DELETE SET NULL`; on required
/// columns they use `ON DELETE RESTRICT`.

use sqlx::postgres::PgPool;
use tracing::info;

use crate::models::{EntityDef, FieldDef, FieldDefault, FieldType, CREATED_AT, UPDATED_AT};
use crate::registry::Registry;

/// `CREATE TABLE IF NOT EXISTS` statements for every kind, referenced tables first
pub fn schema_statements(registry: &Registry) -> Vec<String> {
    registry
        .kinds()
        .map(|kind| create_table(registry.def(kind)))
        .collect()
}

/// Creates missing tables
pub async fn sync_schema(pool: &PgPool, registry: &Registry) -> Result<(), sqlx::Error> {
    for statement in schema_statements(registry) {
        sqlx::query(&statement).execute(pool).await?;
    }

    info!("Database schema synchronized");
    Ok(())
}

fn create_table(def: &EntityDef) -> String {
    let mut columns = vec![format!(r#""{}" BIGSERIAL PRIMARY KEY"#, def.primary_key)];
    columns.extend(def.fields.iter().map(column));
    columns.push(format!(r#""{CREATED_AT}" TIMESTAMPTZ NOT NULL DEFAULT NOW()"#));
    columns.push(format!(r#""{UPDATED_AT}" TIMESTAMPTZ NOT NULL DEFAULT NOW()"#));

    format!(
        "CREATE TABLE IF NOT EXISTS \"{}\" (\n    {}\n)",
        def.table(),
        columns.join(",\n    ")
    )
}

fn column(field: &FieldDef) -> String {
    let mut sql = format!(r#""{}" {}"#, field.name, sql_type(&field.ty));

    if !field.nullable {
        sql.push_str(" NOT NULL");
    }
    if field.unique {
        sql.push_str(" UNIQUE");
    }
    if let Some(FieldDefault::Bool(value)) = field.default {
        sql.push_str(if value { " DEFAULT TRUE" } else { " DEFAULT FALSE" });
    }
    if let FieldType::Enum(allowed) = field.ty {
        let values: Vec<String> = allowed
            .iter()
            .map(|value| format!("'{}'", value.replace('\'', "''")))
            .collect();
        sql.push_str(&format!(r#" CHECK ("{}" IN ({}))"#, field.name, values.join(", ")));
    }
    if let Some(target) = field.references {
        let on_delete = if field.nullable { "SET NULL" } else { "RESTRICT" };
        sql.push_str(&format!(
            r#" REFERENCES "{}" ("{}") ON DELETE {}"#,
            target.name(),
            target.def().primary_key,
            on_delete
        ));
    }

    sql
}

fn sql_type(ty: &FieldType) -> String {
    match ty {
        FieldType::Integer => "BIGINT".to_string(),
        FieldType::String { max } => format!("VARCHAR({max})"),
        FieldType::Text | FieldType::Enum(_) => "TEXT".to_string(),
        FieldType::Boolean => "BOOLEAN".to_string(),
        FieldType::Time => "TIME".to_string(),
        FieldType::DateTime => "TIMESTAMPTZ".to_string(),
    }
}
