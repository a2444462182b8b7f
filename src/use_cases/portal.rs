// Guest authorization workflow: validate, authorize, render, then record.

use std::sync::Arc;
use tokio::task::JoinHandle;
use url::Url;

use crate::domain::{
    ConsentPage, ErrorPage, GuestAuthorizer, GuestRequest, Page, PageRenderer, PortalError,
    ThankYouPage, ValidationErrors,
};
use crate::interface_adapters::protocol::{LandingParams, SubmissionParams};
use crate::use_cases::record_audit::AuditRecorder;
use crate::use_cases::validate::{SubmissionCheck, check_submission, parse_landing};

// Sent when even the error page cannot be rendered.
pub const FALLBACK_ERROR_BODY: &str = "Something went wrong. Please try again later.";

/// Page text and redirect defaults shown to every guest.
#[derive(Clone, Debug)]
pub struct SiteSettings {
    /// Controller site this portal serves; other landing paths get the error page.
    pub site: String,
    pub title: String,
    pub intro: String,
    pub terms: String,
    /// Used when the guest arrived without an original destination.
    pub default_redirect_url: String,
}

// Where a request ended up in the authorization workflow.
#[derive(Debug)]
pub enum WorkflowState {
    AwaitingConsent,
    Authorized,
    Error(PortalError),
}

// Rendered outcome of one request.
#[derive(Debug)]
pub struct PortalResponse {
    pub state: WorkflowState,
    pub body: String,
    // Detached audit write started after a successful authorization.
    pub audit_task: Option<JoinHandle<()>>,
}

#[derive(Clone)]
pub struct PortalWorkflow {
    pub site: Arc<SiteSettings>,
    pub authorizer: Arc<dyn GuestAuthorizer>,
    pub renderer: Arc<dyn PageRenderer>,
    pub recorder: AuditRecorder,
}

impl PortalWorkflow {
    // Landing: show the consent form for a well-formed controller redirect.
    pub fn landing(&self, site: &str, params: LandingParams) -> PortalResponse {
        if site != self.site.site {
            tracing::error!(%site, "landing request for unknown site");
            return self.fail(PortalError::UnknownSite(site.to_string()));
        }

        let guest = match parse_landing(params) {
            Ok(guest) => guest,
            Err(err) => {
                tracing::error!(error = %err, "malformed landing request");
                return self.fail(err.into());
            }
        };

        let page = self.consent_page(&guest, String::new(), false, ValidationErrors::new());
        self.respond(WorkflowState::AwaitingConsent, &page)
    }

    // Submission: re-show the form on field errors, otherwise authorize the device.
    pub async fn submit(&self, params: SubmissionParams) -> PortalResponse {
        let check = match check_submission(params) {
            Ok(check) => check,
            Err(err) => {
                tracing::error!(error = %err, "malformed consent submission");
                return self.fail(err.into());
            }
        };

        let submission = match check {
            SubmissionCheck::Accepted(submission) => submission,
            SubmissionCheck::Rejected {
                guest,
                contact_address,
                consent_checked,
                errors,
            } => {
                tracing::debug!(?errors, "consent form errors");
                let page = self.consent_page(&guest, contact_address, consent_checked, errors);
                return self.respond(WorkflowState::AwaitingConsent, &page);
            }
        };

        let guest = &submission.guest;
        let grant = match self
            .authorizer
            .authorize(&guest.device_id, &guest.access_point_id)
            .await
        {
            Ok(grant) => grant,
            Err(err) => {
                tracing::error!(error = %err, device_id = %guest.device_id, "guest authorization failed");
                return self.fail(err.into());
            }
        };
        if let Some(cleanup) = &grant.cleanup_failure {
            tracing::debug!(error = %cleanup, "authorization kept despite session cleanup failure");
        }

        let redirect_url = match web_url(&guest.redirect_url) {
            Some(url) => url,
            None => {
                if !guest.redirect_url.is_empty() {
                    tracing::warn!(url = %guest.redirect_url, "ignoring non-web redirect target");
                }
                self.site.default_redirect_url.clone()
            }
        };
        tracing::debug!(url = %redirect_url, "redirecting guest");

        let page = Page::ThankYou(ThankYouPage {
            title: self.site.title.clone(),
            redirect_url,
        });
        let body = match self.renderer.render(&page) {
            Ok(body) => body,
            Err(err) => {
                tracing::error!(error = %err, "failed to render thank-you page");
                return self.fail(err.into());
            }
        };

        // The guest is told first; the audit write never delays the response.
        let audit_task = self.recorder.spawn_record(&submission);

        PortalResponse {
            state: WorkflowState::Authorized,
            body,
            audit_task: Some(audit_task),
        }
    }

    fn consent_page(
        &self,
        guest: &GuestRequest,
        contact_address: String,
        consent_checked: bool,
        errors: ValidationErrors,
    ) -> Page {
        Page::Consent(ConsentPage {
            title: self.site.title.clone(),
            intro: self.site.intro.clone(),
            terms: self.site.terms.clone(),
            device_id: guest.device_id.clone(),
            access_point_id: guest.access_point_id.clone(),
            network_id: guest.network_id.clone(),
            redirect_url: guest.redirect_url.clone(),
            contact_address,
            consent_checked,
            errors,
        })
    }

    fn respond(&self, state: WorkflowState, page: &Page) -> PortalResponse {
        match self.renderer.render(page) {
            Ok(body) => PortalResponse {
                state,
                body,
                audit_task: None,
            },
            Err(err) => {
                tracing::error!(error = %err, "failed to render page");
                self.fail(err.into())
            }
        }
    }

    fn fail(&self, error: PortalError) -> PortalResponse {
        let page = Page::Error(ErrorPage {
            title: self.site.title.clone(),
        });
        let body = self.renderer.render(&page).unwrap_or_else(|err| {
            tracing::error!(error = %err, "failed to render error page");
            FALLBACK_ERROR_BODY.to_string()
        });

        PortalResponse {
            state: WorkflowState::Error(error),
            body,
            audit_task: None,
        }
    }
}

// Only absolute http(s) URLs are followed after authorization.
fn web_url(raw: &str) -> Option<String> {
    let parsed = Url::parse(raw).ok()?;
    matches!(parsed.scheme(), "http" | "https").then(|| raw.to_string())
}
