use crate::use_cases::PortalWorkflow;

#[derive(Clone)]
pub struct AppState {
    // Holds the injected controller, renderer and audit store behind trait objects.
    pub workflow: PortalWorkflow,
}
