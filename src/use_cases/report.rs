use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use crate::domain::{AuditStore, Clock, StorageError};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("report window of {0} days reaches before the earliest representable time")]
    WindowOutOfRange(u32),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

// Contact addresses collected over a trailing window, ready to export.
pub struct ContactReport {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub rows: usize,
    pub csv: String,
}

// Contact export use case with injected dependencies.
pub struct ContactReportUseCase<C, S> {
    pub clock: C,
    pub store: S,
}

impl<C, S> ContactReportUseCase<C, S>
where
    C: Clock,
    S: AuditStore,
{
    pub async fn execute(&self, days: u32) -> Result<ContactReport, ReportError> {
        let to = self.clock.now();
        let from = Duration::try_days(i64::from(days))
            .and_then(|window| to.checked_sub_signed(window))
            .ok_or(ReportError::WindowOutOfRange(days))?;

        let records = self.store.list_between(from, to).await?;

        let mut csv = String::new();
        for record in &records {
            csv.push_str(&quote(&record.contact_address));
            csv.push('\n');
        }

        Ok(ContactReport {
            from,
            to,
            rows: records.len(),
            csv,
        })
    }
}

// Every field is quoted; embedded quotes are doubled.
fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}
