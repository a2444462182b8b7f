use secrecy::ExposeSecret;
use std::path::Path;
use thiserror::Error;

use crate::frameworks::config::PortalConfig;
use crate::frameworks::db;
use crate::interface_adapters::stores::{PostgresAuditStore, SystemClock};
use crate::use_cases::{ContactReportUseCase, ReportError};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to configure database pool: {0}")]
    Pool(#[from] sqlx::Error),
    #[error(transparent)]
    Report(#[from] ReportError),
    #[error("failed to write report: {0}")]
    Write(#[from] std::io::Error),
}

// Export contact addresses collected over the last `days` days as CSV.
pub async fn run_report(
    config: &PortalConfig,
    days: u32,
    output: Option<&Path>,
) -> Result<(), ExportError> {
    let pool = db::connect_pool(config.audit.database_url.expose_secret())?;
    let use_case = ContactReportUseCase {
        clock: SystemClock,
        store: PostgresAuditStore::new(pool, config.audit.table_name.clone()),
    };

    let report = use_case.execute(days).await?;

    match output {
        Some(path) => tokio::fs::write(path, report.csv.as_bytes()).await?,
        None => {
            use tokio::io::AsyncWriteExt;
            let mut stdout = tokio::io::stdout();
            stdout.write_all(report.csv.as_bytes()).await?;
            stdout.flush().await?;
        }
    }

    tracing::info!(
        from = %report.from,
        to = %report.to,
        rows = report.rows,
        "contact report written"
    );

    Ok(())
}
