pub mod portal;
pub mod record_audit;
pub mod report;
pub mod validate;

#[cfg(test)]
pub(crate) mod test_support;

pub use portal::{PortalResponse, PortalWorkflow, SiteSettings, WorkflowState};
pub use record_audit::AuditRecorder;
pub use report::{ContactReport, ContactReportUseCase, ReportError};
