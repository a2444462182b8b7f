use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{AuditRecord, AuditStore, Clock, StorageError};

// PostgreSQL-backed audit log. Rows are only ever inserted.
#[derive(Clone)]
pub struct PostgresAuditStore {
    db: PgPool,
    // Validated as a plain identifier when the configuration is loaded.
    table: String,
}

impl PostgresAuditStore {
    pub fn new(db: PgPool, table: impl Into<String>) -> Self {
        Self {
            db,
            table: table.into(),
        }
    }
}

#[derive(sqlx::FromRow)]
struct AuditRow {
    record_id: Uuid,
    email: String,
    id: String,
    ap: String,
    ssid: String,
    date: DateTime<Utc>,
}

impl From<AuditRow> for AuditRecord {
    fn from(row: AuditRow) -> Self {
        AuditRecord {
            record_id: row.record_id,
            contact_address: row.email,
            device_id: row.id,
            access_point_id: row.ap,
            network_id: row.ssid,
            timestamp: row.date,
        }
    }
}

#[async_trait]
impl AuditStore for PostgresAuditStore {
    async fn append(&self, record: AuditRecord) -> Result<(), StorageError> {
        let sql = format!(
            r#"INSERT INTO {} (record_id, email, id, ap, ssid, "date") VALUES ($1, $2, $3, $4, $5, $6)"#,
            self.table
        );

        sqlx::query(&sql)
            .bind(record.record_id)
            .bind(&record.contact_address)
            .bind(&record.device_id)
            .bind(&record.access_point_id)
            .bind(&record.network_id)
            .bind(record.timestamp)
            .execute(&self.db)
            .await
            .map_err(|err| StorageError(err.to_string()))?;

        Ok(())
    }

    async fn list_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<AuditRecord>, StorageError> {
        let sql = format!(
            r#"SELECT record_id, email, id, ap, ssid, "date" FROM {} WHERE "date" BETWEEN $1 AND $2 ORDER BY "date""#,
            self.table
        );

        let rows = sqlx::query_as::<_, AuditRow>(&sql)
            .bind(from)
            .bind(to)
            .fetch_all(&self.db)
            .await
            .map_err(|err| StorageError(err.to_string()))?;

        Ok(rows.into_iter().map(AuditRecord::from).collect())
    }
}

// System clock adapter used by the audit and report use cases.
#[derive(Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
