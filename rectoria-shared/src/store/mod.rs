/// Storage backends
///
/// A [`Store`] persists records of every registered kind. Values handed to a
/// store are already normalized by the entity definitions; the store assigns
/// primary keys, maintains timestamps and enforces uniqueness and foreign
/// keys.
///
/// # Backends
///
/// - [`MemoryStore`]: process-local tables, used by tests and when no
///   database is configured
/// - [`PgStore`]: PostgreSQL through a sqlx pool

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::error::EntityError;
use crate::models::{EntityKind, Filter, Record};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Persistence for entity records
#[async_trait]
pub trait Store: Send + Sync {
    /// Short backend name reported by health checks
    fn backend(&self) -> &'static str;

    async fn find_by_pk(&self, kind: EntityKind, id: i64) -> Result<Option<Record>, EntityError>;

    /// Records matching every condition, ordered by primary key
    async fn find_all(&self, kind: EntityKind, filter: &Filter) -> Result<Vec<Record>, EntityError>;

    /// Inserts a record and returns its stored snapshot
    async fn insert(&self, kind: EntityKind, values: Record) -> Result<Record, EntityError>;

    /// Applies changes and returns the stored snapshot, or `None` when the
    /// primary key does not exist
    async fn update(
        &self,
        kind: EntityKind,
        id: i64,
        changes: Record,
    ) -> Result<Option<Record>, EntityError>;

    /// Removes a record, returning whether it existed
    async fn delete(&self, kind: EntityKind, id: i64) -> Result<bool, EntityError>;

    /// Verifies the backend is reachable
    async fn ping(&self) -> Result<(), EntityError>;
}
