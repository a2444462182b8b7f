use crate::domain::entities::ValidationErrors;

// View models handed to the page renderer.
#[derive(Clone, Debug)]
pub enum Page {
    Consent(ConsentPage),
    ThankYou(ThankYouPage),
    Error(ErrorPage),
}

// Terms-of-service form, optionally re-shown with submitted values and errors.
#[derive(Clone, Debug)]
pub struct ConsentPage {
    pub title: String,
    pub intro: String,
    pub terms: String,
    pub device_id: String,
    pub access_point_id: String,
    pub network_id: String,
    pub redirect_url: String,
    pub contact_address: String,
    pub consent_checked: bool,
    pub errors: ValidationErrors,
}

impl ConsentPage {
    pub fn email_error(&self) -> Option<&'static str> {
        self.errors.get("email")
    }

    pub fn tos_error(&self) -> Option<&'static str> {
        self.errors.get("tos")
    }
}

#[derive(Clone, Debug)]
pub struct ThankYouPage {
    pub title: String,
    pub redirect_url: String,
}

#[derive(Clone, Debug)]
pub struct ErrorPage {
    pub title: String,
}
