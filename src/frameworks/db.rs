use sqlx::{PgPool, postgres::PgPoolOptions};

// Build a small PostgreSQL pool. Connections are opened on first use so the
// portal can start while the database is still unavailable.
pub fn connect_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(5)
        .connect_lazy(database_url)
}

// Create the audit table if it does not exist yet. `table` must already be a
// validated plain identifier.
pub async fn ensure_audit_table(pool: &PgPool, table: &str) -> Result<(), sqlx::Error> {
    let create = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table} (
            record_id UUID PRIMARY KEY,
            email TEXT NOT NULL,
            id TEXT NOT NULL,
            ap TEXT NOT NULL,
            ssid TEXT NOT NULL,
            "date" TIMESTAMPTZ NOT NULL
        )
        "#
    );
    sqlx::query(&create).execute(pool).await?;

    let index = format!(r#"CREATE INDEX IF NOT EXISTS {table}_date_idx ON {table} ("date")"#);
    sqlx::query(&index).execute(pool).await?;

    Ok(())
}
