/// In-memory store
///
/// Keeps one ordered table per kind behind a single lock, so every write sees
/// a consistent view of all tables while checking constraints. Integrity
/// rules mirror the PostgreSQL schema:
///
/// - unique columns reject duplicate non-null values
/// - foreign keys must point at an existing record
/// - deleting a referenced record fails when the referencing column is
///   non-nullable and nulls the column otherwise
///
/// # Example
///
/// ```
/// use rectoria_shared::models::{EntityKind, Filter, Record};
/// use rectoria_shared::store::{MemoryStore, Store};
/// use serde_json::json;
///
/// # #[tokio::main]
/// # async fn main() {
/// let store = MemoryStore::new();
/// let mut values = Record::new();
/// values.insert("NombreRol".into(), json!("admin"));
/// values.insert("Descripcion".into(), json!(null));
///
/// let stored = store.insert(EntityKind::Rol, values).await.unwrap();
/// assert_eq!(stored["RolID"], json!(1));
///
/// let all = store.find_all(EntityKind::Rol, &Filter::new()).await.unwrap();
/// assert_eq!(all.len(), 1);
/// # }
/// ```

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;

use super::Store;
use crate::error::{ConstraintViolation, EntityError};
use crate::models::field::format_timestamp;
use crate::models::{EntityKind, Filter, Record, CREATED_AT, UPDATED_AT};

#[derive(Debug, Default)]
struct Table {
    next_id: i64,
    rows: BTreeMap<i64, Record>,
}

type Tables = HashMap<EntityKind, Table>;

/// Process-local storage for every kind
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn find_by_pk(&self, kind: EntityKind, id: i64) -> Result<Option<Record>, EntityError> {
        let tables = self.tables.read().await;
        Ok(tables.get(&kind).and_then(|table| table.rows.get(&id)).cloned())
    }

    async fn find_all(&self, kind: EntityKind, filter: &Filter) -> Result<Vec<Record>, EntityError> {
        let tables = self.tables.read().await;
        let Some(table) = tables.get(&kind) else {
            return Ok(Vec::new());
        };

        Ok(table
            .rows
            .values()
            .filter(|row| filter.matches(row))
            .cloned()
            .collect())
    }

    async fn insert(&self, kind: EntityKind, values: Record) -> Result<Record, EntityError> {
        let mut tables = self.tables.write().await;
        check_unique(&tables, kind, None, &values)?;
        check_references(&tables, kind, &values)?;

        let table = tables.entry(kind).or_default();
        table.next_id += 1;
        let id = table.next_id;

        let now = Value::String(format_timestamp(Utc::now()));
        let mut row = Record::new();
        row.insert(kind.def().primary_key.to_string(), Value::from(id));
        row.extend(values);
        row.insert(CREATED_AT.to_string(), now.clone());
        row.insert(UPDATED_AT.to_string(), now);

        table.rows.insert(id, row.clone());
        debug!(kind = %kind, id, "Inserted record");
        Ok(row)
    }

    async fn update(
        &self,
        kind: EntityKind,
        id: i64,
        changes: Record,
    ) -> Result<Option<Record>, EntityError> {
        let mut tables = self.tables.write().await;
        let exists = tables
            .get(&kind)
            .is_some_and(|table| table.rows.contains_key(&id));
        if !exists {
            return Ok(None);
        }

        check_unique(&tables, kind, Some(id), &changes)?;
        check_references(&tables, kind, &changes)?;

        let Some(row) = tables.get_mut(&kind).and_then(|table| table.rows.get_mut(&id)) else {
            return Ok(None);
        };
        row.extend(changes);
        row.insert(
            UPDATED_AT.to_string(),
            Value::String(format_timestamp(Utc::now())),
        );

        debug!(kind = %kind, id, "Updated record");
        Ok(Some(row.clone()))
    }

    async fn delete(&self, kind: EntityKind, id: i64) -> Result<bool, EntityError> {
        let mut tables = self.tables.write().await;
        let exists = tables
            .get(&kind)
            .is_some_and(|table| table.rows.contains_key(&id));
        if !exists {
            return Ok(false);
        }

        let referrers = referencing_columns(kind);

        // Restrictions are checked before anything is nulled.
        for (referrer, field, nullable) in &referrers {
            if *nullable {
                continue;
            }
            let referenced = tables.get(referrer).is_some_and(|table| {
                table.rows.values().any(|row| row.get(*field) == Some(&Value::from(id)))
            });
            if referenced {
                return Err(ConstraintViolation::StillReferenced {
                    entity: kind,
                    id,
                    referrer: *referrer,
                    field: field.to_string(),
                }
                .into());
            }
        }

        for (referrer, field, _) in referrers.iter().filter(|(_, _, nullable)| *nullable) {
            if let Some(table) = tables.get_mut(referrer) {
                for row in table.rows.values_mut() {
                    if row.get(*field) == Some(&Value::from(id)) {
                        row.insert(field.to_string(), Value::Null);
                    }
                }
            }
        }

        let removed = tables
            .get_mut(&kind)
            .and_then(|table| table.rows.remove(&id))
            .is_some();

        debug!(kind = %kind, id, "Deleted record");
        Ok(removed)
    }

    async fn ping(&self) -> Result<(), EntityError> {
        Ok(())
    }
}

/// Columns of other kinds that reference `kind`, as `(referrer, column, nullable)`
fn referencing_columns(kind: EntityKind) -> Vec<(EntityKind, &'static str, bool)> {
    EntityKind::ALL
        .iter()
        .flat_map(|referrer| {
            referrer
                .def()
                .foreign_keys()
                .filter(move |(_, target)| *target == kind)
                .map(move |(field, _)| (*referrer, field.name, field.nullable))
        })
        .collect()
}

fn check_unique(
    tables: &Tables,
    kind: EntityKind,
    own_id: Option<i64>,
    values: &Record,
) -> Result<(), ConstraintViolation> {
    let Some(table) = tables.get(&kind) else {
        return Ok(());
    };

    for field in kind.def().fields.iter().filter(|field| field.unique) {
        let Some(value) = values.get(field.name).filter(|value| !value.is_null()) else {
            continue;
        };

        let taken = table
            .rows
            .iter()
            .any(|(id, row)| Some(*id) != own_id && row.get(field.name) == Some(value));

        if taken {
            return Err(ConstraintViolation::Unique {
                entity: kind,
                field: field.name.to_string(),
            });
        }
    }

    Ok(())
}

fn check_references(tables: &Tables, kind: EntityKind, values: &Record) -> Result<(), ConstraintViolation> {
    for (field, target) in kind.def().foreign_keys() {
        let Some(id) = values.get(field.name).and_then(Value::as_i64) else {
            continue;
        };

        let exists = tables
            .get(&target)
            .is_some_and(|table| table.rows.contains_key(&id));

        if !exists {
            return Err(ConstraintViolation::MissingReference {
                entity: kind,
                field: field.name.to_string(),
                target,
                id,
            });
        }
    }

    Ok(())
}
