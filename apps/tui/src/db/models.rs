use sqlx::FromRow;

/// One row of the `preferences` table.
#[derive(Debug, Clone, FromRow)]
pub struct PreferenceRecord {
    pub key: String,
    pub value: String,
    pub updated: String,
}
