/// Database layer
///
/// # Modules
///
/// - `pool`: PostgreSQL connection pool with health checks
/// - `schema`: table creation from the entity registry
///
/// # Example
///
/// ```no_run
/// use rectoria_shared::db::pool::{create_pool, PoolConfig};
/// use rectoria_shared::db::schema::sync_schema;
/// use rectoria_shared::registry::Registry;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = PoolConfig {
///         url: std::env::var("DATABASE_URL")?,
///         ..Default::default()
///     };
///
///     let pool = create_pool(&config).await?;
///     sync_schema(&pool, &Registry::new()?).await?;
///     Ok(())
/// }
/// ```

pub mod pool;
pub mod schema;
