use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use crate::domain::{
    AuditRecord, AuditStore, AuthorizationGrant, Clock, ControllerError, ControllerPhase,
    GuestAuthorizer, Page, PageRenderer, RenderError, StorageError,
};

pub(crate) fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0)
        .single()
        .expect("valid fixed time")
}

// Shared fixed time source for deterministic use-case tests.
pub(crate) struct FixedClock(pub(crate) DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[derive(Clone)]
pub(crate) struct RecordingAuditStore {
    records: Arc<Mutex<Vec<AuditRecord>>>,
    fail_append: bool,
    append_delay: Option<Duration>,
}

impl RecordingAuditStore {
    pub(crate) fn new() -> Self {
        Self {
            records: Arc::new(Mutex::new(Vec::new())),
            fail_append: false,
            append_delay: None,
        }
    }

    pub(crate) fn failing(mut self) -> Self {
        self.fail_append = true;
        self
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.append_delay = Some(delay);
        self
    }

    pub(crate) fn seed(&self, record: AuditRecord) {
        let mut guard = self.records.lock().expect("records mutex poisoned");
        guard.push(record);
    }

    pub(crate) fn records(&self) -> Vec<AuditRecord> {
        let guard = self.records.lock().expect("records mutex poisoned");
        guard.clone()
    }

    // Polls until the detached audit task has written `count` records.
    pub(crate) async fn wait_for_records(&self, count: usize) -> Vec<AuditRecord> {
        for _ in 0..100 {
            let records = self.records();
            if records.len() >= count {
                return records;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.records()
    }
}

#[async_trait]
impl AuditStore for RecordingAuditStore {
    async fn append(&self, record: AuditRecord) -> Result<(), StorageError> {
        if let Some(delay) = self.append_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_append {
            return Err(StorageError("append failed".to_string()));
        }

        let mut guard = self.records.lock().expect("records mutex poisoned");
        guard.push(record);
        Ok(())
    }

    async fn list_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<AuditRecord>, StorageError> {
        if self.fail_append {
            return Err(StorageError("scan failed".to_string()));
        }

        let guard = self.records.lock().expect("records mutex poisoned");
        Ok(guard
            .iter()
            .filter(|record| record.timestamp >= from && record.timestamp <= to)
            .cloned()
            .collect())
    }
}

// Canned controller behaviour for workflow tests.
#[derive(Clone, Copy, Debug)]
pub(crate) enum ControllerScript {
    Grant,
    GrantWithCleanupFailure,
    Reject(ControllerPhase),
    Unreachable(ControllerPhase),
}

#[derive(Clone)]
pub(crate) struct ScriptedAuthorizer {
    script: ControllerScript,
    calls: Arc<Mutex<Vec<(String, String)>>>,
}

impl ScriptedAuthorizer {
    pub(crate) fn new(script: ControllerScript) -> Self {
        Self {
            script,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub(crate) fn calls(&self) -> Vec<(String, String)> {
        let guard = self.calls.lock().expect("calls mutex poisoned");
        guard.clone()
    }
}

#[async_trait]
impl GuestAuthorizer for ScriptedAuthorizer {
    async fn authorize(
        &self,
        device_id: &str,
        access_point_id: &str,
    ) -> Result<AuthorizationGrant, ControllerError> {
        {
            let mut guard = self.calls.lock().expect("calls mutex poisoned");
            guard.push((device_id.to_string(), access_point_id.to_string()));
        }

        match self.script {
            ControllerScript::Grant => Ok(AuthorizationGrant {
                cleanup_failure: None,
            }),
            ControllerScript::GrantWithCleanupFailure => Ok(AuthorizationGrant {
                cleanup_failure: Some(ControllerError::CleanupFailed {
                    cause: "connection reset".to_string(),
                }),
            }),
            ControllerScript::Reject(phase) => Err(ControllerError::AuthFailed {
                phase,
                detail: "status 403".to_string(),
            }),
            ControllerScript::Unreachable(phase) => Err(ControllerError::Transport {
                phase,
                cause: "connection refused".to_string(),
            }),
        }
    }
}

// Renders a one-line text summary of each page, optionally failing for chosen pages.
#[derive(Clone, Copy, Default)]
pub(crate) struct TextRenderer {
    pub fail_consent: bool,
    pub fail_thank_you: bool,
    pub fail_error: bool,
}

impl PageRenderer for TextRenderer {
    fn render(&self, page: &Page) -> Result<String, RenderError> {
        match page {
            Page::Consent(_) if self.fail_consent => Err(RenderError("consent".to_string())),
            Page::ThankYou(_) if self.fail_thank_you => Err(RenderError("thank-you".to_string())),
            Page::Error(_) if self.fail_error => Err(RenderError("error".to_string())),
            Page::Consent(page) => {
                let errors: Vec<&str> = page.errors.iter().map(|(_, message)| message).collect();
                Ok(format!(
                    "consent|{}|{}|{}|{}",
                    page.title,
                    page.device_id,
                    page.contact_address,
                    errors.join(";")
                ))
            }
            Page::ThankYou(page) => Ok(format!("thank-you|{}|{}", page.title, page.redirect_url)),
            Page::Error(page) => Ok(format!("error|{}", page.title)),
        }
    }
}
