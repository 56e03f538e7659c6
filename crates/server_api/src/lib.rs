//! Submission relay: turns one `{day, formData}` payload into one store
//! record per guest.
//!
//! Dispatch runs in two phases. The primary contact's record is created
//! first; if that fails nothing else is attempted. Friend records are then
//! created concurrently and every outcome is collected, so a partial failure
//! reports exactly which rows exist. Nothing is rolled back.

use std::sync::Arc;

use futures::future::join_all;
use record_store::RecordStore;
use serde::Deserialize;
use serde_json::Value;
use shared::{
    domain::{Day, GuestEntry, GuestType, RecordId, RsvpRecord},
    error::ApiError,
    protocol::{DispatchSummary, FailedGuest, RsvpAccepted},
};
use thiserror::Error;
use tracing::{error, info, warn};

pub const INVALID_REQUEST_FORMAT: &str = "Invalid request format";
pub const NO_FORM_DATA: &str = "No form data provided";
pub const PRIMARY_INCOMPLETE: &str = "Primary contact information is incomplete";
pub const SUBMITTED: &str = "RSVP submitted successfully";
pub const PROCESSING_FAILED: &str = "Failed to process RSVP";

#[derive(Clone)]
pub struct RelayContext {
    pub store: Arc<dyn RecordStore>,
}

impl RelayContext {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }
}

/// A validated submission for one day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub day: Day,
    pub primary: GuestEntry,
    pub friends: Vec<GuestEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordPlan {
    pub primary: RsvpRecord,
    pub friends: Vec<RsvpRecord>,
}

#[derive(Debug, Error)]
#[error("{details}")]
pub struct RelayFailure {
    /// Present once the primary record exists.
    pub summary: Option<DispatchSummary>,
    pub details: String,
}

#[derive(Debug, Error)]
pub enum RsvpRejection {
    #[error(transparent)]
    Invalid(ApiError),
    #[error(transparent)]
    Failed(RelayFailure),
}

impl RsvpRejection {
    /// What the caller is told; store failures are reported generically.
    pub fn api_error(&self) -> ApiError {
        match self {
            RsvpRejection::Invalid(err) => err.clone(),
            RsvpRejection::Failed(_) => ApiError::upstream(PROCESSING_FAILED),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawRequest {
    #[serde(default)]
    day: Option<Value>,
    #[serde(default, rename = "formData")]
    form_data: Option<Value>,
}

/// One `formData` entry. Fields that are absent or not strings read as
/// empty, and so does an entry that is not an object at all.
#[derive(Debug, Default, Deserialize)]
struct RawGuest {
    #[serde(default)]
    name: Option<Value>,
    #[serde(default)]
    email: Option<Value>,
    #[serde(default)]
    phone: Option<Value>,
    #[serde(default)]
    about: Option<Value>,
}

fn text(value: Option<Value>) -> String {
    match value {
        Some(Value::String(text)) => text,
        _ => String::new(),
    }
}

impl From<RawGuest> for GuestEntry {
    fn from(raw: RawGuest) -> Self {
        Self {
            name: text(raw.name),
            email: text(raw.email),
            phone: text(raw.phone),
            about: text(raw.about),
        }
    }
}

fn lenient_guest(entry: Value) -> GuestEntry {
    serde_json::from_value::<RawGuest>(entry)
        .unwrap_or_default()
        .into()
}

pub fn parse_submission(body: &[u8]) -> Result<Submission, ApiError> {
    let invalid = || ApiError::validation(INVALID_REQUEST_FORMAT);

    let raw: RawRequest = serde_json::from_slice(body).map_err(|_| invalid())?;
    let day = raw
        .day
        .as_ref()
        .and_then(Value::as_str)
        .and_then(|day| day.parse::<Day>().ok())
        .ok_or_else(invalid)?;
    let Some(Value::Array(entries)) = raw.form_data else {
        return Err(invalid());
    };
    if entries.is_empty() {
        return Err(ApiError::validation(NO_FORM_DATA));
    }

    let mut guests = entries.into_iter().map(lenient_guest).collect::<Vec<_>>();

    let friends = guests.split_off(1);
    let primary = guests.remove(0);
    let blank = |value: &str| value.trim().is_empty();
    if blank(&primary.name) || blank(&primary.email) || blank(&primary.phone) || blank(&primary.about)
    {
        return Err(ApiError::validation(PRIMARY_INCOMPLETE));
    }

    Ok(Submission {
        day,
        primary,
        friends,
    })
}

pub fn plan_records(submission: &Submission) -> RecordPlan {
    let primary = &submission.primary;
    let friend_names = submission
        .friends
        .iter()
        .map(|friend| friend.name.clone())
        .collect::<Vec<_>>();

    RecordPlan {
        primary: RsvpRecord {
            name: primary.name.clone(),
            email: primary.email.clone(),
            phone: primary.phone.clone(),
            about: primary.about.clone(),
            day: submission.day,
            guest_type: GuestType::Primary,
            primary_contact: None,
            guests: Some(friend_names),
        },
        friends: submission
            .friends
            .iter()
            .map(|friend| RsvpRecord {
                name: friend.name.clone(),
                email: friend.email.clone(),
                phone: friend.phone.clone(),
                about: friend.about.clone(),
                day: submission.day,
                guest_type: GuestType::Friend,
                primary_contact: Some(primary.name.clone()),
                guests: None,
            })
            .collect(),
    }
}

pub async fn dispatch_records(
    ctx: &RelayContext,
    plan: &RecordPlan,
) -> Result<DispatchSummary, RelayFailure> {
    let primary = ctx
        .store
        .create_record(&plan.primary)
        .await
        .map_err(|err| {
            error!(guest = %plan.primary.name, day = %plan.primary.day, %err, "primary record failed");
            RelayFailure {
                summary: None,
                details: err.to_string(),
            }
        })?;

    let outcomes = join_all(
        plan.friends
            .iter()
            .map(|friend| ctx.store.create_record(friend)),
    )
    .await;

    let mut friends: Vec<RecordId> = Vec::with_capacity(plan.friends.len());
    let mut failed = Vec::new();
    for (record, outcome) in plan.friends.iter().zip(outcomes) {
        match outcome {
            Ok(id) => friends.push(id),
            Err(err) => {
                error!(guest = %record.name, day = %record.day, %err, "friend record failed");
                failed.push(FailedGuest {
                    name: record.name.clone(),
                    error: err.to_string(),
                });
            }
        }
    }

    let summary = DispatchSummary {
        primary,
        friends,
        failed,
    };
    match summary.failed.first() {
        None => Ok(summary),
        Some(first) => Err(RelayFailure {
            details: first.error.clone(),
            summary: Some(summary),
        }),
    }
}

/// Validates, maps and dispatches one raw request body.
pub async fn relay_rsvp(ctx: &RelayContext, body: &[u8]) -> Result<RsvpAccepted, RsvpRejection> {
    let submission = parse_submission(body).map_err(|err| {
        warn!(reason = %err.message, "rejected RSVP payload");
        RsvpRejection::Invalid(err)
    })?;
    let plan = plan_records(&submission);
    let summary = dispatch_records(ctx, &plan)
        .await
        .map_err(RsvpRejection::Failed)?;

    info!(
        day = %submission.day,
        primary = %submission.primary.name,
        friends = summary.friends.len(),
        "RSVP relayed"
    );
    Ok(RsvpAccepted {
        success: true,
        message: SUBMITTED.to_string(),
        data: summary,
    })
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
