use crate::domain::{ConsentSubmission, GuestRequest, RequestMalformed, ValidationErrors};
use crate::interface_adapters::protocol::{LandingParams, SubmissionParams};

pub const CONTACT_REQUIRED: &str = "Please enter your contact address";
pub const CONSENT_REQUIRED: &str = "You must agree to the Terms of Service";

// Result of checking a consent form whose identifiers were present.
#[derive(Debug, PartialEq, Eq)]
pub enum SubmissionCheck {
    Accepted(ConsentSubmission),
    // Field errors; the submitted values are kept so the form can be re-shown.
    Rejected {
        guest: GuestRequest,
        contact_address: String,
        consent_checked: bool,
        errors: ValidationErrors,
    },
}

// Validate the controller redirect that lands a guest on the portal.
pub fn parse_landing(params: LandingParams) -> Result<GuestRequest, RequestMalformed> {
    guest_request(params.id, params.ap, params.ssid, params.url)
}

// Validate a posted consent form. Field checks are exhaustive, not short-circuiting.
pub fn check_submission(params: SubmissionParams) -> Result<SubmissionCheck, RequestMalformed> {
    let guest = guest_request(params.id, params.ap, params.ssid, params.url)?;
    let contact_address = params.email.unwrap_or_default();
    let consent_given = consent_affirmed(params.tos.as_deref());

    let mut errors = ValidationErrors::new();
    if contact_address.trim().is_empty() {
        errors.add("email", CONTACT_REQUIRED);
    }
    if !consent_given {
        errors.add("tos", CONSENT_REQUIRED);
    }

    if !errors.is_empty() {
        return Ok(SubmissionCheck::Rejected {
            guest,
            contact_address,
            consent_checked: consent_given,
            errors,
        });
    }

    Ok(SubmissionCheck::Accepted(ConsentSubmission {
        guest,
        contact_address: contact_address.trim().to_string(),
        consent_given,
    }))
}

fn guest_request(
    id: Option<String>,
    ap: Option<String>,
    ssid: Option<String>,
    url: Option<String>,
) -> Result<GuestRequest, RequestMalformed> {
    Ok(GuestRequest {
        device_id: require(id, "id")?,
        access_point_id: require(ap, "ap")?,
        network_id: require(ssid, "ssid")?,
        redirect_url: url.unwrap_or_default(),
    })
}

fn require(value: Option<String>, field: &'static str) -> Result<String, RequestMalformed> {
    match value {
        None => Err(RequestMalformed::Missing(field)),
        Some(value) if value.is_empty() => Err(RequestMalformed::Empty(field)),
        Some(value) => Ok(value),
    }
}

// A checkbox counts as affirmed when present, unless it carries an explicit negative.
fn consent_affirmed(value: Option<&str>) -> bool {
    match value {
        None => false,
        Some(value) => !matches!(
            value.trim().to_ascii_lowercase().as_str(),
            "" | "false" | "off" | "no" | "0"
        ),
    }
}
