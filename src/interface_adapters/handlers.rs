use axum::{
    body::Bytes,
    extract::{Path, RawQuery, State},
    http::{HeaderMap, StatusCode, header},
    response::Html,
};
use std::sync::Arc;

use crate::domain::PortalError;
use crate::interface_adapters::protocol::{LandingParams, SubmissionParams};
use crate::interface_adapters::state::AppState;
use crate::use_cases::{PortalResponse, WorkflowState};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

// Query and form are parsed by hand so malformed input still gets the portal's error page.
#[tracing::instrument(
    name = "guest_landing",
    skip_all,
    fields(site = %site, device_id = tracing::field::Empty)
)]
pub async fn landing(
    State(state): State<Arc<AppState>>,
    Path(site): Path<String>,
    RawQuery(query): RawQuery,
) -> (StatusCode, Html<String>) {
    let params = LandingParams::from_query(query.as_deref().unwrap_or_default());
    record_device(params.id.as_deref());

    into_http(state.workflow.landing(&site, params))
}

#[tracing::instrument(
    name = "consent_submit",
    skip_all,
    fields(device_id = tracing::field::Empty)
)]
pub async fn submit_consent(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Html<String>) {
    // Any other body type is read as an empty form, which fails as a missing device id.
    let params = if is_form(&headers) {
        SubmissionParams::from_form(&body)
    } else {
        tracing::debug!("consent submission without a form content type");
        SubmissionParams::default()
    };
    record_device(params.id.as_deref());

    // The audit task keeps running after its handle is dropped.
    into_http(state.workflow.submit(params).await)
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.trim_start().starts_with(FORM_CONTENT_TYPE))
}

fn record_device(device_id: Option<&str>) {
    if let Some(device_id) = device_id {
        tracing::Span::current().record("device_id", device_id);
    }
}

fn into_http(response: PortalResponse) -> (StatusCode, Html<String>) {
    (status_for(&response.state), Html(response.body))
}

pub fn status_for(state: &WorkflowState) -> StatusCode {
    match state {
        WorkflowState::AwaitingConsent | WorkflowState::Authorized => StatusCode::OK,
        WorkflowState::Error(PortalError::RequestMalformed(_)) => StatusCode::BAD_REQUEST,
        WorkflowState::Error(PortalError::UnknownSite(_)) => StatusCode::NOT_FOUND,
        WorkflowState::Error(PortalError::Controller(_) | PortalError::Render(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
