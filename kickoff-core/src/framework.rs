use sqlx::PgPool;

/// An open Postgres transaction.
pub type PgTransaction<'c> = sqlx::Transaction<'c, sqlx::Postgres>;

/// Executes query structs against the connection pool.
///
/// Read queries implement `kanau::processor::Processor` for this type;
/// multi-row writes go through the `*_tx` functions on the entities instead.
#[derive(Debug, Clone)]
pub struct DatabaseProcessor {
    pub pool: PgPool,
}

impl DatabaseProcessor {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Begin a transaction. Dropping it without `commit` rolls it back.
    pub async fn begin(&self) -> Result<PgTransaction<'static>, sqlx::Error> {
        self.pool.begin().await
    }
}
