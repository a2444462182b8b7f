use askama::Template;
use url::Url;

use crate::domain::{ConsentPage, ErrorPage, Page, PageRenderer, RenderError, ThankYouPage};

// Templates live in `templates/` and HTML-escape every interpolated value.
#[derive(Template)]
#[template(path = "consent.html")]
struct ConsentTemplate<'a> {
    page: &'a ConsentPage,
}

#[derive(Template)]
#[template(path = "thank_you.html")]
struct ThankYouTemplate<'a> {
    page: &'a ThankYouPage,
    // Escaping does not neutralize `javascript:` and similar schemes, so links are filtered here.
    redirect_href: &'a str,
}

#[derive(Template)]
#[template(path = "error.html")]
struct ErrorTemplate<'a> {
    page: &'a ErrorPage,
}

// Renderer backed by compiled askama templates.
#[derive(Clone, Copy, Default)]
pub struct AskamaRenderer;

impl PageRenderer for AskamaRenderer {
    fn render(&self, page: &Page) -> Result<String, RenderError> {
        let rendered = match page {
            Page::Consent(page) => ConsentTemplate { page }.render(),
            Page::ThankYou(page) => ThankYouTemplate {
                page,
                redirect_href: web_href(&page.redirect_url),
            }
            .render(),
            Page::Error(page) => ErrorTemplate { page }.render(),
        };

        rendered.map_err(|err| RenderError(err.to_string()))
    }
}

fn web_href(raw: &str) -> &str {
    match Url::parse(raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => raw,
        _ => "#",
    }
}
