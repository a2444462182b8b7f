use serde::Serialize;
use url::form_urlencoded;

// Query string of the controller's redirect to the landing page.
// Every field is optional so an absent parameter can be told apart from an empty one.
#[derive(Debug, Default)]
pub struct LandingParams {
    pub id: Option<String>,
    pub ap: Option<String>,
    pub ssid: Option<String>,
    pub url: Option<String>,
}

impl LandingParams {
    // Repeated keys keep their first value; unknown keys are ignored.
    pub fn from_query(raw: &str) -> Self {
        let mut params = Self::default();
        for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
            let slot = match key.as_ref() {
                "id" => &mut params.id,
                "ap" => &mut params.ap,
                "ssid" => &mut params.ssid,
                "url" => &mut params.url,
                _ => continue,
            };
            slot.get_or_insert_with(|| value.into_owned());
        }
        params
    }
}

// Form body posted by the consent page.
#[derive(Debug, Default)]
pub struct SubmissionParams {
    pub id: Option<String>,
    pub ap: Option<String>,
    pub ssid: Option<String>,
    pub url: Option<String>,
    pub email: Option<String>,
    // Checkbox: browsers omit the field entirely when unchecked.
    pub tos: Option<String>,
}

impl SubmissionParams {
    // Same first-value-wins rule as the landing query.
    pub fn from_form(body: &[u8]) -> Self {
        let mut params = Self::default();
        for (key, value) in form_urlencoded::parse(body) {
            let slot = match key.as_ref() {
                "id" => &mut params.id,
                "ap" => &mut params.ap,
                "ssid" => &mut params.ssid,
                "url" => &mut params.url,
                "email" => &mut params.email,
                "tos" => &mut params.tos,
                _ => continue,
            };
            slot.get_or_insert_with(|| value.into_owned());
        }
        params
    }
}

// Admin login payload sent to the controller.
#[derive(Debug, Serialize)]
pub struct ControllerLoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

// Station manager command sent to the site-scoped command endpoint.
// The controller receives `minutes` as a string, e.g. `"480"`.
#[derive(Debug, Serialize)]
pub struct StationCommand<'a> {
    pub cmd: &'a str,
    pub mac: &'a str,
    pub minutes: String,
}
