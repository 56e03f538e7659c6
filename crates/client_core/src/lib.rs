//! Client side of the RSVP flow: the per-day form state machine and the
//! HTTP client that hands finished forms to the relay.

pub mod client;
pub mod form;
pub mod labels;
pub mod phone;
pub mod validation;

pub use client::{
    base_url_from_env, resolve_base_url, ClientError, RsvpClient, RsvpTransport, API_URL_ENV,
    DEFAULT_API_BASE_URL, GENERIC_SUBMISSION_ERROR,
};
pub use form::{Confirmation, DayForm, DayPhase, FormError, RsvpForm, SubmissionTicket};

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
