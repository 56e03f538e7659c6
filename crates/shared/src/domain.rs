use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper bound on guests a single party may register for one day.
pub const MAX_GUESTS_PER_DAY: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Day {
    Thursday,
    Friday,
    Saturday,
}

impl Day {
    /// Confirmation priority order: the first submitted day in this list wins.
    pub const ALL: [Day; 3] = [Day::Thursday, Day::Friday, Day::Saturday];

    pub fn as_str(self) -> &'static str {
        match self {
            Day::Thursday => "thursday",
            Day::Friday => "friday",
            Day::Saturday => "saturday",
        }
    }

    /// Capitalised form used for the store's `Day` select option.
    pub fn display_name(self) -> &'static str {
        match self {
            Day::Thursday => "Thursday",
            Day::Friday => "Friday",
            Day::Saturday => "Saturday",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Day::Thursday => 0,
            Day::Friday => 1,
            Day::Saturday => 2,
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown day '{0}'")]
pub struct UnknownDay(pub String);

impl FromStr for Day {
    type Err = UnknownDay;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "thursday" => Ok(Day::Thursday),
            "friday" => Ok(Day::Friday),
            "saturday" => Ok(Day::Saturday),
            _ => Err(UnknownDay(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GuestType {
    Primary,
    Friend,
}

impl GuestType {
    pub fn as_str(self) -> &'static str {
        match self {
            GuestType::Primary => "Primary",
            GuestType::Friend => "Friend",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GuestField {
    Name,
    Email,
    Phone,
    About,
}

impl GuestField {
    pub const ALL: [GuestField; 4] = [
        GuestField::Name,
        GuestField::Email,
        GuestField::Phone,
        GuestField::About,
    ];
}

/// One guest's answers as typed into the form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestEntry {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub about: String,
}

impl GuestEntry {
    pub fn field(&self, field: GuestField) -> &str {
        match field {
            GuestField::Name => &self.name,
            GuestField::Email => &self.email,
            GuestField::Phone => &self.phone,
            GuestField::About => &self.about,
        }
    }

    pub fn field_mut(&mut self, field: GuestField) -> &mut String {
        match field {
            GuestField::Name => &mut self.name,
            GuestField::Email => &mut self.email,
            GuestField::Phone => &mut self.phone,
            GuestField::About => &mut self.about,
        }
    }
}

/// A row headed for the record store. Written once, never updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RsvpRecord {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub about: String,
    pub day: Day,
    pub guest_type: GuestType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_contact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guests: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub String);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
