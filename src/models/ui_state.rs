use std::time::Duration;

use chrono::NaiveDate;
use tokio::time::Instant;

use super::slots::SlotSet;

#[derive(Debug, Clone, PartialEq)]
pub enum UiState {
    NoDateSelected,
    LoadingSlots {
        date: NaiveDate,
    },
    SlotsAvailable {
        date: NaiveDate,
        slots: SlotSet,
    },
    NoSlotsAvailable {
        date: NaiveDate,
    },
    SlotsFailed {
        date: NaiveDate,
        error: String,
    },
    SlotChosen {
        date: NaiveDate,
        slots: SlotSet,
        slot: String,
    },
    Submitting {
        date: NaiveDate,
        slots: SlotSet,
        slot: String,
    },
    BookingSucceeded,
    BookingFailed {
        date: NaiveDate,
        slots: SlotSet,
        slot: String,
        error: String,
    },
}

impl UiState {
    pub fn as_str(&self) -> &'static str {
        match self {
            UiState::NoDateSelected => "no_date_selected",
            UiState::LoadingSlots { .. } => "loading_slots",
            UiState::SlotsAvailable { .. } => "slots_available",
            UiState::NoSlotsAvailable { .. } => "no_slots_available",
            UiState::SlotsFailed { .. } => "slots_failed",
            UiState::SlotChosen { .. } => "slot_chosen",
            UiState::Submitting { .. } => "submitting",
            UiState::BookingSucceeded => "booking_succeeded",
            UiState::BookingFailed { .. } => "booking_failed",
        }
    }

    /// The slot set currently on screen, if any.
    pub fn slots(&self) -> Option<&SlotSet> {
        match self {
            UiState::SlotsAvailable { slots, .. }
            | UiState::SlotChosen { slots, .. }
            | UiState::Submitting { slots, .. }
            | UiState::BookingFailed { slots, .. } => Some(slots),
            _ => None,
        }
    }

    pub fn selected_slot(&self) -> Option<&str> {
        match self {
            UiState::SlotChosen { slot, .. }
            | UiState::Submitting { slot, .. }
            | UiState::BookingFailed { slot, .. } => Some(slot),
            _ => None,
        }
    }

    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            UiState::NoDateSelected | UiState::BookingSucceeded => None,
            UiState::LoadingSlots { date }
            | UiState::SlotsAvailable { date, .. }
            | UiState::NoSlotsAvailable { date }
            | UiState::SlotsFailed { date, .. }
            | UiState::SlotChosen { date, .. }
            | UiState::Submitting { date, .. }
            | UiState::BookingFailed { date, .. } => Some(*date),
        }
    }

    pub fn submit_enabled(&self) -> bool {
        matches!(
            self,
            UiState::SlotChosen { .. } | UiState::BookingFailed { .. }
        )
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self, UiState::Submitting { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Success,
    Error,
}

impl MessageKind {
    pub fn css_class(&self) -> &'static str {
        match self {
            MessageKind::Success => "booking-success",
            MessageKind::Error => "booking-error",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusMessage {
    pub text: String,
    pub kind: MessageKind,
    pub shown_at: Instant,
}

impl StatusMessage {
    pub fn new(text: impl Into<String>, kind: MessageKind) -> Self {
        Self {
            text: text.into(),
            kind,
            shown_at: Instant::now(),
        }
    }

    pub fn is_visible(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.shown_at) < ttl
    }

    pub fn remaining(&self, now: Instant, ttl: Duration) -> Duration {
        ttl.saturating_sub(now.saturating_duration_since(self.shown_at))
    }
}
