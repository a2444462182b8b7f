use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::domain::{AuditRecord, AuditStore, Clock, ConsentSubmission, StorageError};

// Writes one audit record per successful authorization.
#[derive(Clone)]
pub struct AuditRecorder {
    pub store: Arc<dyn AuditStore>,
    pub clock: Arc<dyn Clock>,
    pub write_timeout: Duration,
}

impl AuditRecorder {
    pub async fn record(
        &self,
        contact_address: &str,
        device_id: &str,
        access_point_id: &str,
        network_id: &str,
    ) -> Result<(), StorageError> {
        let record = AuditRecord {
            record_id: Uuid::new_v4(),
            contact_address: contact_address.to_string(),
            device_id: device_id.to_string(),
            access_point_id: access_point_id.to_string(),
            network_id: network_id.to_string(),
            timestamp: self.clock.now(),
        };

        match tokio::time::timeout(self.write_timeout, self.store.append(record)).await {
            Ok(result) => result,
            Err(_) => Err(StorageError(format!(
                "write timed out after {}ms",
                self.write_timeout.as_millis()
            ))),
        }
    }

    /// Runs [`record`](Self::record) on a detached task.
    ///
    /// The guest has already been told they are connected, so failures are
    /// only logged. The handle is returned for callers that want to await it;
    /// dropping it leaves the write running.
    pub fn spawn_record(&self, submission: &ConsentSubmission) -> JoinHandle<()> {
        let recorder = self.clone();
        let submission = submission.clone();

        tokio::spawn(async move {
            let guest = &submission.guest;
            let result = recorder
                .record(
                    &submission.contact_address,
                    &guest.device_id,
                    &guest.access_point_id,
                    &guest.network_id,
                )
                .await;

            match result {
                Ok(()) => tracing::debug!(device_id = %guest.device_id, "audit record written"),
                Err(err) => tracing::error!(
                    error = %err,
                    device_id = %guest.device_id,
                    "failed to write audit record"
                ),
            }
        })
    }
}
