/// Generic data access layer
///
/// Uniform create, read, list, update and delete over every entity kind.
/// Each call resolves the kind, normalizes caller data against the kind's
/// definition and delegates to the configured [`Store`]. Nothing is cached
/// between calls.
///
/// Failures come back as [`DataAccessError`], whose message names the
/// operation and kind before the inner cause:
///
/// ```text
/// Error al leer la entidad 'Rol' con ID 7: No se encontró la entidad 'Rol' con ID 7.
/// ```
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use rectoria_shared::data_access::DataAccess;
/// use rectoria_shared::registry::Registry;
/// use rectoria_shared::store::MemoryStore;
/// use serde_json::json;
///
/// # #[tokio::main]
/// # async fn main() {
/// let data = DataAccess::new(Arc::new(Registry::new().unwrap()), Arc::new(MemoryStore::new()));
///
/// let body = json!({"NombreRol": "admin"});
/// let role = data.create("Rol", body.as_object().unwrap()).await.unwrap();
/// assert_eq!(role["RolID"], json!(1));
///
/// let err = data.read("Rol", 7).await.unwrap_err();
/// assert!(err.is_not_found());
/// # }
/// ```

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::EntityError;
use crate::models::{EntityKind, Filter, Record};
use crate::registry::{Registry, RelationKind};
use crate::store::Store;

/// Entity kind given either as a typed variant or as a name to resolve
pub trait KindRef {
    fn resolve(&self) -> Result<EntityKind, EntityError>;

    /// Name used in error messages, even when the kind does not resolve
    fn label(&self) -> String;
}

impl KindRef for EntityKind {
    fn resolve(&self) -> Result<EntityKind, EntityError> {
        Ok(*self)
    }

    fn label(&self) -> String {
        self.name().to_string()
    }
}

impl KindRef for &str {
    fn resolve(&self) -> Result<EntityKind, EntityError> {
        self.parse()
    }

    fn label(&self) -> String {
        self.to_string()
    }
}

impl KindRef for String {
    fn resolve(&self) -> Result<EntityKind, EntityError> {
        self.parse()
    }

    fn label(&self) -> String {
        self.clone()
    }
}

/// Failed data access operation
#[derive(Debug, thiserror::Error)]
pub enum DataAccessError {
    #[error("Error al leer la entidad '{kind}' con ID {id}: {source}")]
    Read {
        kind: String,
        id: i64,
        source: EntityError,
    },

    #[error("Error al listar las entidades '{kind}': {source}")]
    List { kind: String, source: EntityError },

    #[error("Error general al crear la entidad '{kind}': {source}")]
    Create { kind: String, source: EntityError },

    #[error("Error al modificar la entidad '{kind}': {source}")]
    Update {
        kind: String,
        id: i64,
        source: EntityError,
    },

    #[error("Error al eliminar la entidad '{kind}': {source}")]
    Delete {
        kind: String,
        id: i64,
        source: EntityError,
    },
}

impl DataAccessError {
    /// Inner cause
    pub fn cause(&self) -> &EntityError {
        match self {
            DataAccessError::Read { source, .. }
            | DataAccessError::List { source, .. }
            | DataAccessError::Create { source, .. }
            | DataAccessError::Update { source, .. }
            | DataAccessError::Delete { source, .. } => source,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.cause().is_not_found()
    }
}

/// Entry point for entity operations
#[derive(Clone)]
pub struct DataAccess {
    registry: Arc<Registry>,
    store: Arc<dyn Store>,
}

impl fmt::Debug for DataAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataAccess")
            .field("backend", &self.store.backend())
            .finish()
    }
}

impl DataAccess {
    pub fn new(registry: Arc<Registry>, store: Arc<dyn Store>) -> Self {
        Self { registry, store }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Backend name of the underlying store
    pub fn backend(&self) -> &'static str {
        self.store.backend()
    }

    /// Checks that the store answers
    pub async fn ping(&self) -> Result<(), EntityError> {
        self.store.ping().await
    }

    /// Fetches one record by primary key
    pub async fn read(&self, kind: impl KindRef, id: i64) -> Result<Record, DataAccessError> {
        self.find(&kind, id).await.map_err(|source| {
            log_failure("read", &kind, &source);
            DataAccessError::Read {
                kind: kind.label(),
                id,
                source,
            }
        })
    }

    /// Fetches one record with the named associations nested under their aliases
    ///
    /// Belongs-to associations load as an object or `null`; has-many
    /// associations load as an array ordered by primary key.
    pub async fn read_with(
        &self,
        kind: impl KindRef,
        id: i64,
        includes: &[&str],
    ) -> Result<Record, DataAccessError> {
        self.find_with(&kind, id, includes).await.map_err(|source| {
            log_failure("read", &kind, &source);
            DataAccessError::Read {
                kind: kind.label(),
                id,
                source,
            }
        })
    }

    /// Lists records matching an equality filter, in insertion order
    pub async fn list(&self, kind: impl KindRef, filter: &Filter) -> Result<Vec<Record>, DataAccessError> {
        let result = async {
            let kind = kind.resolve()?;
            let filter = self.registry.def(kind).prepare_filter(filter)?;
            self.store.find_all(kind, &filter).await
        }
        .await;

        result.map_err(|source| {
            log_failure("list", &kind, &source);
            DataAccessError::List {
                kind: kind.label(),
                source,
            }
        })
    }

    /// Inserts a record; absent fields take their defaults
    pub async fn create(&self, kind: impl KindRef, data: &Record) -> Result<Record, DataAccessError> {
        let result = async {
            let kind = kind.resolve()?;
            let values = self.registry.def(kind).prepare_insert(data)?;
            let created = self.store.insert(kind, values).await?;
            debug!(kind = %kind, "Created record");
            Ok::<_, EntityError>(created)
        }
        .await;

        result.map_err(|source| {
            log_failure("create", &kind, &source);
            DataAccessError::Create {
                kind: kind.label(),
                source,
            }
        })
    }

    /// Merges the supplied fields into an existing record
    pub async fn update(
        &self,
        kind: impl KindRef,
        id: i64,
        data: &Record,
    ) -> Result<Record, DataAccessError> {
        let result = async {
            let resolved = kind.resolve()?;
            let existing = self.find(&resolved, id).await?;

            let changes = self.registry.def(resolved).prepare_update(data)?;
            if changes.is_empty() {
                return Ok::<_, EntityError>(existing);
            }

            let updated = self
                .store
                .update(resolved, id, changes)
                .await?
                .ok_or(EntityError::NotFound { kind: resolved, id })?;
            debug!(kind = %resolved, id, "Updated record");
            Ok(updated)
        }
        .await;

        result.map_err(|source| {
            log_failure("update", &kind, &source);
            DataAccessError::Update {
                kind: kind.label(),
                id,
                source,
            }
        })
    }

    /// Removes an existing record
    pub async fn delete(&self, kind: impl KindRef, id: i64) -> Result<(), DataAccessError> {
        let result = async {
            let resolved = kind.resolve()?;
            self.find(&resolved, id).await?;

            if !self.store.delete(resolved, id).await? {
                return Err(EntityError::NotFound { kind: resolved, id });
            }
            debug!(kind = %resolved, id, "Deleted record");
            Ok(())
        }
        .await;

        result.map_err(|source| {
            log_failure("delete", &kind, &source);
            DataAccessError::Delete {
                kind: kind.label(),
                id,
                source,
            }
        })
    }

    async fn find(&self, kind: &impl KindRef, id: i64) -> Result<Record, EntityError> {
        let kind = kind.resolve()?;
        self.store
            .find_by_pk(kind, id)
            .await?
            .ok_or(EntityError::NotFound { kind, id })
    }

    async fn find_with(
        &self,
        kind: &impl KindRef,
        id: i64,
        includes: &[&str],
    ) -> Result<Record, EntityError> {
        let kind = kind.resolve()?;

        // Resolve every alias before touching storage.
        let relations = includes
            .iter()
            .map(|alias| {
                self.registry
                    .relation(kind, alias)
                    .copied()
                    .ok_or_else(|| EntityError::UnknownRelation {
                        kind,
                        alias: alias.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut record = self.find(&kind, id).await?;

        for relation in relations {
            let loaded = match relation.kind {
                RelationKind::BelongsTo => {
                    match record.get(relation.foreign_key).and_then(Value::as_i64) {
                        Some(target_id) => self
                            .store
                            .find_by_pk(relation.target, target_id)
                            .await?
                            .map(Value::Object)
                            .unwrap_or(Value::Null),
                        None => Value::Null,
                    }
                }
                RelationKind::HasMany => {
                    let filter = Filter::new().eq(relation.foreign_key, id);
                    let rows = self.store.find_all(relation.target, &filter).await?;
                    Value::Array(rows.into_iter().map(Value::Object).collect())
                }
            };

            record.insert(relation.alias.to_string(), loaded);
        }

        Ok(record)
    }
}

fn log_failure(operation: &str, kind: &impl KindRef, error: &EntityError) {
    if error.is_not_found() {
        debug!(operation, kind = %kind.label(), error = %error, "Entity operation failed");
    } else {
        warn!(operation, kind = %kind.label(), error = %error, "Entity operation failed");
    }
}
