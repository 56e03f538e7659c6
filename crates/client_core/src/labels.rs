//! Copy shown around the form: field labels, button text, confirmation lines.

use shared::domain::Day;

pub fn ordinal(n: usize) -> String {
    let suffix = match (n % 10, n % 100) {
        (1, r) if r != 11 => "st",
        (2, r) if r != 12 => "nd",
        (3, r) if r != 13 => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

/// Label for the name field of guest `index` (1-based among friends).
pub fn friend_label(index: usize, total: usize) -> String {
    if index == 1 && total == 2 {
        return "your friend's name".to_string();
    }
    format!("your {} friend's name", ordinal(index))
}

pub fn day_text(day: Day) -> String {
    format!("{} morning", day.as_str())
}

pub fn first_name(full_name: &str) -> &str {
    full_name
        .split_whitespace()
        .next()
        .unwrap_or("you")
}

pub fn step_action_label(step: usize, count: usize, submitting: bool) -> &'static str {
    if submitting {
        "submitting..."
    } else if step + 1 < count {
        "next"
    } else {
        "rsvp"
    }
}
