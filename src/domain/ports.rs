use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::{AuditRecord, AuthorizationGrant};
use crate::domain::errors::{ControllerError, RenderError, StorageError};
use crate::domain::pages::Page;

// Port for the access controller. The workflow depends on this trait, not the HTTP client.
#[async_trait]
pub trait GuestAuthorizer: Send + Sync {
    async fn authorize(
        &self,
        device_id: &str,
        access_point_id: &str,
    ) -> Result<AuthorizationGrant, ControllerError>;
}

// Append-only store for audit records.
#[async_trait]
pub trait AuditStore: Send + Sync {
    async fn append(&self, record: AuditRecord) -> Result<(), StorageError>;
    // Records with from <= timestamp <= to, used by reporting only.
    async fn list_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<AuditRecord>, StorageError>;
}

// Port for turning a view model into an HTML body.
pub trait PageRenderer: Send + Sync {
    fn render(&self, page: &Page) -> Result<String, RenderError>;
}

// Port for retrieving the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
