//! Rows returned by the record statements.

use chrono::{DateTime, Utc};
use diesel::QueryableByName;
use diesel::sql_types::{BigInt, Bool, Text, Timestamptz};

use crate::domain::{Record, RecordId};

/// Full record row; column names follow the table schema.
#[derive(Debug, Clone, QueryableByName)]
pub(crate) struct RecordRow {
    #[diesel(sql_type = BigInt)]
    pub id: i64,
    #[diesel(sql_type = Text)]
    pub name: String,
    #[diesel(sql_type = Timestamptz)]
    pub create_at: DateTime<Utc>,
    #[diesel(sql_type = Timestamptz)]
    pub update_at: DateTime<Utc>,
}

impl From<RecordRow> for Record {
    fn from(row: RecordRow) -> Self {
        Self {
            id: RecordId::new(row.id),
            name: row.name,
            created_at: row.create_at,
            updated_at: row.update_at,
        }
    }
}

#[derive(Debug, QueryableByName)]
pub(crate) struct IdRow {
    #[diesel(sql_type = BigInt)]
    pub id: i64,
}

#[derive(Debug, QueryableByName)]
pub(crate) struct ExistsRow {
    #[diesel(sql_type = Bool)]
    pub found: bool,
}
