//! Frontend Models
//!
//! View-side types and display helpers on top of the board model.

use board_engine::{Card, Priority};
use chrono::{DateTime, Utc};

/// Info confirms a finished action; Error reports a failed one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Error,
}

impl NotificationLevel {
    pub fn class(self) -> &'static str {
        match self {
            NotificationLevel::Info => "notification info",
            NotificationLevel::Error => "notification error",
        }
    }
}

/// Transient message shown in the corner of the board
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: u64,
    pub level: NotificationLevel,
    pub message: String,
}

/// Filter options: (value, label)
pub const PRIORITY_OPTIONS: &[(&str, &str)] = &[("low", "Low"), ("normal", "Normal"), ("high", "High")];

pub fn priority_label(priority: Priority) -> &'static str {
    match priority {
        Priority::Low => "Low",
        Priority::Normal => "Normal",
        Priority::High => "High",
    }
}

/// CSS modifier for a priority badge
pub fn priority_class(priority: Priority) -> &'static str {
    match priority {
        Priority::Low => "priority-badge low",
        Priority::Normal => "priority-badge normal",
        Priority::High => "priority-badge high",
    }
}

/// Due date as shown on a card, e.g. `Mar 1`
pub fn due_label(due: &DateTime<Utc>) -> String {
    due.format("%b %-d").to_string()
}

/// A due date in the past (by calendar day) is overdue
pub fn is_overdue(due: &DateTime<Utc>, now: &DateTime<Utc>) -> bool {
    due.date_naive() < now.date_naive()
}

/// Key shown on a card; falls back to a short id when the server sent none
pub fn card_key(card: &Card) -> String {
    if card.card_key.is_empty() {
        let id = card.id.as_str();
        let start = id.len().saturating_sub(6);
        format!("#{}", id.get(start..).unwrap_or(id))
    } else {
        card.card_key.clone()
    }
}
