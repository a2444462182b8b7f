use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::{AuthorizationGrant, ControllerError, ControllerPhase, GuestAuthorizer};
use crate::interface_adapters::protocol::{ControllerLoginRequest, StationCommand};

const AUTHORIZE_GUEST_CMD: &str = "authorize-guest";

/// Connection and credential settings for the access controller.
#[derive(Clone, Debug)]
pub struct ControllerSettings {
    /// Base URL without a trailing slash, e.g. `https://unifi.local:8443`.
    pub base_url: String,
    pub username: String,
    pub password: Secret<String>,
    /// Site identifier used in the command endpoint path.
    pub site: String,
    /// How long an authorized guest keeps network access.
    pub session_minutes: u32,
    /// Upper bound for each individual controller call.
    pub request_timeout: Duration,
    /// Accept self-signed or otherwise unverifiable controller certificates.
    pub insecure_skip_verify: bool,
}

// Runs one login/authorize/logout sequence per guest attempt.
#[derive(Clone)]
pub struct ControllerSessionClient {
    settings: Arc<ControllerSettings>,
}

impl ControllerSessionClient {
    pub fn new(settings: ControllerSettings) -> Self {
        if settings.insecure_skip_verify {
            tracing::warn!(
                controller_url = %settings.base_url,
                "TLS certificate verification is disabled for the controller"
            );
        }

        Self {
            settings: Arc::new(settings),
        }
    }

    // A fresh client per attempt gives each guest its own cookie jar.
    fn open_session(&self) -> Result<ControllerSession<'_>, ControllerError> {
        let http = Client::builder()
            .cookie_store(true)
            .timeout(self.settings.request_timeout)
            .danger_accept_invalid_certs(self.settings.insecure_skip_verify)
            .build()
            .map_err(|err| ControllerError::Transport {
                phase: ControllerPhase::Authenticate,
                cause: describe(&err),
            })?;

        Ok(ControllerSession {
            http,
            settings: &self.settings,
        })
    }
}

#[async_trait]
impl GuestAuthorizer for ControllerSessionClient {
    #[tracing::instrument(
        name = "controller_authorize",
        skip_all,
        fields(device_id = %device_id, access_point_id = %access_point_id, site = %self.settings.site)
    )]
    async fn authorize(
        &self,
        device_id: &str,
        access_point_id: &str,
    ) -> Result<AuthorizationGrant, ControllerError> {
        let session = self.open_session()?;

        // Without an admin session there is nothing to log out of.
        session.authenticate().await?;

        let authorized = session.authorize_guest(device_id).await;

        // Logout runs whatever the authorize outcome was.
        let cleanup_failure = session.logout().await.err();
        if let Some(err) = &cleanup_failure {
            tracing::warn!(error = %err, "failed to close controller session");
        }

        authorized?;
        tracing::info!("guest authorized on controller");

        Ok(AuthorizationGrant { cleanup_failure })
    }
}

// One authenticated admin session; dropped (with its cookies) after logout.
struct ControllerSession<'a> {
    http: Client,
    settings: &'a ControllerSettings,
}

impl ControllerSession<'_> {
    async fn authenticate(&self) -> Result<(), ControllerError> {
        let url = format!("{}/api/login", self.settings.base_url);
        let body = ControllerLoginRequest {
            username: &self.settings.username,
            password: self.settings.password.expose_secret(),
        };

        self.post_expecting_ok(url, &body, ControllerPhase::Authenticate)
            .await
    }

    async fn authorize_guest(&self, device_id: &str) -> Result<(), ControllerError> {
        let url = format!(
            "{}/api/s/{}/cmd/stamgr",
            self.settings.base_url, self.settings.site
        );
        let body = StationCommand {
            cmd: AUTHORIZE_GUEST_CMD,
            mac: device_id,
            minutes: self.settings.session_minutes.to_string(),
        };

        self.post_expecting_ok(url, &body, ControllerPhase::Authorize)
            .await
    }

    async fn post_expecting_ok<T>(
        &self,
        url: String,
        body: &T,
        phase: ControllerPhase,
    ) -> Result<(), ControllerError>
    where
        T: Serialize + ?Sized,
    {
        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|err| ControllerError::Transport {
                phase,
                cause: describe(&err),
            })?;
        let status = response.status();

        tracing::debug!(%phase, code = status.as_u16(), "controller response");

        // The controller signals success with 200 only.
        if status != StatusCode::OK {
            return Err(ControllerError::AuthFailed {
                phase,
                detail: format!("status {}", status.as_u16()),
            });
        }

        Ok(())
    }

    async fn logout(self) -> Result<(), ControllerError> {
        let url = format!("{}/logout", self.settings.base_url);
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|err| ControllerError::CleanupFailed {
                cause: describe(&err),
            })?;
        let status = response.status();

        tracing::debug!(code = status.as_u16(), "logout response");

        if !status.is_success() {
            return Err(ControllerError::CleanupFailed {
                cause: format!("status {}", status.as_u16()),
            });
        }

        Ok(())
    }
}

fn describe(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        format!("timed out: {err}")
    } else {
        err.to_string()
    }
}
