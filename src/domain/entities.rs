use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::domain::errors::ControllerError;

// Guest identifiers carried by the controller redirect into the portal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GuestRequest {
    pub device_id: String,
    pub access_point_id: String,
    pub network_id: String,
    // Empty when the guest had no original destination.
    pub redirect_url: String,
}

// A consent form that passed field validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConsentSubmission {
    pub guest: GuestRequest,
    pub contact_address: String,
    pub consent_given: bool,
}

/// Field-level messages shown on the consent form.
///
/// Keys are the form field names (`email`, `tos`). An empty set means the
/// submission may proceed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    messages: BTreeMap<&'static str, &'static str>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &'static str, message: &'static str) {
        self.messages.insert(field, message);
    }

    pub fn get(&self, field: &str) -> Option<&'static str> {
        self.messages.get(field).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.messages.iter().map(|(field, message)| (*field, *message))
    }
}

// Outcome of a controller attempt that authorized the device.
#[derive(Debug)]
pub struct AuthorizationGrant {
    // Set when the session could not be closed; never fails the grant.
    pub cleanup_failure: Option<ControllerError>,
}

// Durable proof that a guest accepted the terms and was authorized.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuditRecord {
    pub record_id: Uuid,
    pub contact_address: String,
    pub device_id: String,
    pub access_point_id: String,
    pub network_id: String,
    pub timestamp: DateTime<Utc>,
}
