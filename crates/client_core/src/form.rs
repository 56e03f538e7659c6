//! Multi-step RSVP form state, one container per event day.

use shared::{
    domain::{Day, GuestEntry, GuestField, MAX_GUESTS_PER_DAY},
    protocol::{RsvpAccepted, RsvpRequest},
};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    client::{ClientError, RsvpTransport},
    labels::{day_text, first_name},
    phone::format_phone_input,
    validation::{validate_entry, FieldErrors},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayPhase {
    /// No guests selected.
    Idle,
    Collecting,
    Submitting,
    /// Terminal.
    Submitted,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("{0} can no longer be edited")]
    Locked(Day),
    #[error("no guests selected for {0}")]
    NoGuests(Day),
    #[error("step {step} does not exist for {day}")]
    InvalidStep { day: Day, step: usize },
    #[error("{0} is not on its final step")]
    NotOnFinalStep(Day),
    #[error("step {step} for {day} has missing or invalid fields")]
    StepIncomplete { day: Day, step: usize },
    #[error("an RSVP for {0} is already being submitted")]
    SubmissionInFlight(Day),
    #[error("an RSVP for {0} was already submitted")]
    AlreadySubmitted(Day),
    #[error("submission ticket for {0} does not match the one in flight")]
    StaleTicket(Day),
}

/// Guests, error flags, cursor and phase for one day.
///
/// `guests` and `errors` always have the same length, which is the day's
/// guest count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayForm {
    guests: Vec<GuestEntry>,
    errors: Vec<FieldErrors>,
    step: usize,
    phase: DayPhase,
}

impl Default for DayForm {
    fn default() -> Self {
        Self {
            guests: Vec::new(),
            errors: Vec::new(),
            step: 0,
            phase: DayPhase::Idle,
        }
    }
}

impl DayForm {
    pub fn count(&self) -> usize {
        self.guests.len()
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn phase(&self) -> DayPhase {
        self.phase
    }

    pub fn guests(&self) -> &[GuestEntry] {
        &self.guests
    }

    pub fn guest(&self, step: usize) -> Option<&GuestEntry> {
        self.guests.get(step)
    }

    pub fn errors(&self, step: usize) -> Option<&FieldErrors> {
        self.errors.get(step)
    }

    pub fn is_final_step(&self) -> bool {
        self.count() > 0 && self.step + 1 == self.count()
    }

    fn is_editable(&self) -> bool {
        matches!(self.phase, DayPhase::Idle | DayPhase::Collecting)
    }

    fn resize(&mut self, count: usize) {
        let count = count.min(MAX_GUESTS_PER_DAY);
        self.guests.resize_with(count, GuestEntry::default);
        self.errors.resize_with(count, FieldErrors::default);
        self.step = self.step.min(count.saturating_sub(1));
        self.phase = if count == 0 {
            DayPhase::Idle
        } else {
            DayPhase::Collecting
        };
    }

    fn validate(&mut self, step: usize) -> bool {
        let Some(entry) = self.guests.get(step) else {
            return false;
        };
        let result = validate_entry(step, entry);
        self.errors[step] = result;
        !result.any()
    }
}

/// What the caller needs to run a submission outside the form.
#[derive(Debug)]
pub struct SubmissionTicket {
    day: Day,
    request: RsvpRequest,
}

impl SubmissionTicket {
    pub fn day(&self) -> Day {
        self.day
    }

    pub fn request(&self) -> &RsvpRequest {
        &self.request
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    pub day: Day,
    pub first_name: String,
    pub day_text: String,
}

#[derive(Debug, Clone, Default)]
pub struct RsvpForm {
    days: [DayForm; 3],
    submission_error: Option<String>,
    in_flight: Option<Day>,
}

impl RsvpForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn day(&self, day: Day) -> &DayForm {
        &self.days[day.index()]
    }

    fn day_mut(&mut self, day: Day) -> &mut DayForm {
        &mut self.days[day.index()]
    }

    fn editable_day_mut(&mut self, day: Day) -> Result<&mut DayForm, FormError> {
        let form = self.day_mut(day);
        if !form.is_editable() {
            return Err(FormError::Locked(day));
        }
        Ok(form)
    }

    /// Clamps `count` to the per-day maximum and returns the applied count.
    pub fn set_guest_count(&mut self, day: Day, count: usize) -> Result<usize, FormError> {
        let form = self.editable_day_mut(day)?;
        form.resize(count);
        debug!(%day, count = form.count(), "guest count changed");
        Ok(form.count())
    }

    pub fn increment(&mut self, day: Day) -> Result<usize, FormError> {
        let next = self.day(day).count() + 1;
        self.set_guest_count(day, next)
    }

    pub fn decrement(&mut self, day: Day) -> Result<usize, FormError> {
        let next = self.day(day).count().saturating_sub(1);
        self.set_guest_count(day, next)
    }

    /// Stores a field edit and clears that field's error flag.
    pub fn update_field(
        &mut self,
        day: Day,
        step: usize,
        field: GuestField,
        value: &str,
    ) -> Result<(), FormError> {
        let form = self.editable_day_mut(day)?;
        let Some(entry) = form.guests.get_mut(step) else {
            return Err(FormError::InvalidStep { day, step });
        };

        *entry.field_mut(field) = match field {
            GuestField::Phone => format_phone_input(value),
            _ => value.to_string(),
        };
        form.errors[step].set(field, false);
        Ok(())
    }

    /// Re-checks one step and records which fields fail.
    pub fn validate_step(&mut self, day: Day, step: usize) -> bool {
        self.day_mut(day).validate(step)
    }

    /// Moves to the next guest when the current one is complete. The cursor
    /// never passes the last guest.
    pub fn advance(&mut self, day: Day) -> bool {
        let form = self.day_mut(day);
        if form.phase != DayPhase::Collecting {
            return false;
        }
        let step = form.step;
        if !form.validate(step) {
            return false;
        }
        form.step = (step + 1).min(form.count() - 1);
        true
    }

    pub fn retreat(&mut self, day: Day) {
        let form = self.day_mut(day);
        if form.is_editable() {
            form.step = form.step.saturating_sub(1);
        }
    }

    /// Checks every transition guard, then moves `day` into `Submitting`.
    pub fn begin_submission(&mut self, day: Day) -> Result<SubmissionTicket, FormError> {
        if let Some(active) = self.in_flight {
            return Err(FormError::SubmissionInFlight(active));
        }
        if let Some(done) = self.submitted_day() {
            return Err(FormError::AlreadySubmitted(done));
        }

        let form = self.day_mut(day);
        match form.phase {
            DayPhase::Idle => return Err(FormError::NoGuests(day)),
            DayPhase::Collecting => {}
            DayPhase::Submitting | DayPhase::Submitted => return Err(FormError::Locked(day)),
        }
        if !form.is_final_step() {
            return Err(FormError::NotOnFinalStep(day));
        }
        let step = form.step;
        if !form.validate(step) {
            return Err(FormError::StepIncomplete { day, step });
        }

        form.phase = DayPhase::Submitting;
        let request = RsvpRequest {
            day,
            form_data: form.guests.clone(),
        };
        self.in_flight = Some(day);
        self.submission_error = None;
        Ok(SubmissionTicket { day, request })
    }

    pub fn finish_submission(
        &mut self,
        ticket: SubmissionTicket,
        outcome: Result<RsvpAccepted, ClientError>,
    ) -> Result<DayPhase, FormError> {
        let day = ticket.day;
        if self.in_flight != Some(day) {
            return Err(FormError::StaleTicket(day));
        }
        self.in_flight = None;

        let phase = match outcome {
            Ok(accepted) => {
                info!(%day, primary = %accepted.data.primary, "RSVP submitted");
                DayPhase::Submitted
            }
            Err(err) => {
                warn!(%day, %err, "RSVP submission failed");
                self.submission_error = Some(err.user_message());
                DayPhase::Collecting
            }
        };
        self.day_mut(day).phase = phase;
        Ok(phase)
    }

    /// Runs a whole submission for `day` through `transport`.
    pub async fn submit(
        &mut self,
        day: Day,
        transport: &dyn RsvpTransport,
    ) -> Result<DayPhase, FormError> {
        let ticket = self.begin_submission(day)?;
        let outcome = transport.submit_rsvp(ticket.request()).await;
        self.finish_submission(ticket, outcome)
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn submission_error(&self) -> Option<&str> {
        self.submission_error.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.submission_error = None;
    }

    fn submitted_day(&self) -> Option<Day> {
        Day::ALL
            .into_iter()
            .find(|day| self.day(*day).phase == DayPhase::Submitted)
    }

    /// The confirmation screen to show, if any day has been submitted.
    pub fn confirmation(&self) -> Option<Confirmation> {
        let day = self.submitted_day()?;
        let name = self
            .day(day)
            .guest(0)
            .map(|primary| first_name(&primary.name))
            .unwrap_or("you");
        Some(Confirmation {
            day,
            first_name: name.to_string(),
            day_text: day_text(day),
        })
    }
}

#[cfg(test)]
#[path = "tests/form_tests.rs"]
mod tests;
