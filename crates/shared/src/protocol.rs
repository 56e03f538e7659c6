use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Day, GuestEntry, RecordId};

pub const RSVP_ROUTE: &str = "/api/rsvp";
pub const HEALTH_ROUTE: &str = "/health";

/// Body of `POST /api/rsvp`. The first entry is the primary contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RsvpRequest {
    pub day: Day,
    #[serde(rename = "formData")]
    pub form_data: Vec<GuestEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedGuest {
    pub name: String,
    pub error: String,
}

/// Which records a submission created, and which friend records it could not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchSummary {
    pub primary: RecordId,
    #[serde(default)]
    pub friends: Vec<RecordId>,
    #[serde(default)]
    pub failed: Vec<FailedGuest>,
}

impl DispatchSummary {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RsvpAccepted {
    pub success: bool,
    pub message: String,
    pub data: DispatchSummary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<DispatchSummary>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
            data: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_data(mut self, data: DispatchSummary) -> Self {
        self.data = Some(data);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_store: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
