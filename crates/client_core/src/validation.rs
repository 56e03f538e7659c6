use std::sync::OnceLock;

use regex::Regex;
use shared::domain::{GuestEntry, GuestField};

/// Which fields of one guest entry currently fail their rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldErrors {
    pub name: bool,
    pub email: bool,
    pub phone: bool,
    pub about: bool,
}

impl FieldErrors {
    pub fn get(&self, field: GuestField) -> bool {
        match field {
            GuestField::Name => self.name,
            GuestField::Email => self.email,
            GuestField::Phone => self.phone,
            GuestField::About => self.about,
        }
    }

    pub fn set(&mut self, field: GuestField, failing: bool) {
        match field {
            GuestField::Name => self.name = failing,
            GuestField::Email => self.email = failing,
            GuestField::Phone => self.phone = failing,
            GuestField::About => self.about = failing,
        }
    }

    pub fn any(&self) -> bool {
        GuestField::ALL.iter().any(|field| self.get(*field))
    }

    pub fn failing(&self) -> Vec<GuestField> {
        GuestField::ALL
            .into_iter()
            .filter(|field| self.get(*field))
            .collect()
    }
}

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"))
}

pub fn is_valid_email(value: &str) -> bool {
    email_pattern().is_match(value)
}

/// Step 0 is the primary contact and needs every field; later steps only
/// need a name and an about line.
pub fn validate_entry(step: usize, entry: &GuestEntry) -> FieldErrors {
    let blank = |value: &str| value.trim().is_empty();

    let mut errors = FieldErrors {
        name: blank(&entry.name),
        about: blank(&entry.about),
        ..FieldErrors::default()
    };
    if step == 0 {
        errors.email = blank(&entry.email) || !is_valid_email(&entry.email);
        errors.phone = blank(&entry.phone);
    }
    errors
}

#[cfg(test)]
#[path = "tests/validation_tests.rs"]
mod tests;
