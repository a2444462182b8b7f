use std::fmt;
use thiserror::Error;

// Controller protocol step that produced a failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControllerPhase {
    Authenticate,
    Authorize,
}

impl fmt::Display for ControllerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControllerPhase::Authenticate => f.write_str("authentication"),
            ControllerPhase::Authorize => f.write_str("authorization"),
        }
    }
}

// Failures surfaced by the controller session client.
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("controller returned non-success status during {phase}: {detail}")]
    AuthFailed {
        phase: ControllerPhase,
        detail: String,
    },
    #[error("controller transport error during {phase}: {cause}")]
    Transport {
        phase: ControllerPhase,
        cause: String,
    },
    // Logout did not complete. Logged and attached to the grant, never returned as the attempt's error.
    #[error("controller session cleanup failed: {cause}")]
    CleanupFailed { cause: String },
}

// A deep link without the identifiers the controller always supplies.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RequestMalformed {
    #[error("request missing {0} parameter")]
    Missing(&'static str),
    #[error("request has empty {0} parameter")]
    Empty(&'static str),
}

#[derive(Debug, Error)]
#[error("audit storage error: {0}")]
pub struct StorageError(pub String);

#[derive(Debug, Error)]
#[error("page rendering failed: {0}")]
pub struct RenderError(pub String);

// Failures that change the response sent to the guest.
#[derive(Debug, Error)]
pub enum PortalError {
    #[error(transparent)]
    RequestMalformed(#[from] RequestMalformed),
    #[error(transparent)]
    Controller(#[from] ControllerError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("no portal is configured for site {0}")]
    UnknownSite(String),
}
