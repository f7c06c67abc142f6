//! Health probe issuing `SELECT 1` through the pool.

use async_trait::async_trait;
use diesel::sql_query;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{ConnectionProbe, ConnectionProbeError};

use super::pool::DbPool;

#[derive(Clone)]
pub struct DieselConnectionProbe {
    pool: DbPool,
}

impl DieselConnectionProbe {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConnectionProbe for DieselConnectionProbe {
    async fn ping(&self) -> Result<(), ConnectionProbeError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| ConnectionProbeError::unreachable(err.to_string()))?;
        sql_query("SELECT 1")
            .execute(&mut *conn)
            .await
            .map_err(|err| ConnectionProbeError::unreachable(err.to_string()))?;
        Ok(())
    }
}
