// Domain layer: guest identities, audit records, pages and the ports they flow through.

pub mod entities;
pub mod errors;
pub mod pages;
pub mod ports;

pub use entities::{AuditRecord, AuthorizationGrant, ConsentSubmission, GuestRequest, ValidationErrors};
pub use errors::{ControllerError, ControllerPhase, PortalError, RenderError, RequestMalformed, StorageError};
pub use pages::{ConsentPage, ErrorPage, Page, ThankYouPage};
pub use ports::{AuditStore, Clock, GuestAuthorizer, PageRenderer};
