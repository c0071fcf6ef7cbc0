use serde::{Deserialize, Serialize};

use crate::errors::WidgetError;

#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    pub label: String,
    /// Only drives the `.booking-slot.disabled` style; the API never sets it.
    pub disabled: bool,
}

/// Bookable times for a single date, in the order the API returned them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlotSet {
    slots: Vec<Slot>,
}

impl SlotSet {
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            slots: labels
                .into_iter()
                .map(|l| Slot {
                    label: l.into(),
                    disabled: false,
                })
                .collect(),
        }
    }

    pub fn with_disabled(mut self, label: &str) -> Self {
        if let Some(slot) = self.slots.iter_mut().find(|s| s.label == label) {
            slot.disabled = true;
        }
        self
    }

    pub fn get(&self, label: &str) -> Option<&Slot> {
        self.slots.iter().find(|s| s.label == label)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.get(label).is_some()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Slot> {
        self.slots.iter()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Body of `GET /api/v1/available-slots/`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlotsResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_slots: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SlotsResponse {
    pub fn into_slot_set(self) -> Result<SlotSet, WidgetError> {
        if let Some(error) = self.error.filter(|e| !e.is_empty()) {
            return Err(WidgetError::Api(error));
        }
        Ok(SlotSet::from_labels(self.available_slots.unwrap_or_default()))
    }
}

/// What the client reads from a `POST /api/v1/book-appointment/` reply.
/// Only `error` matters; every other field is ignored, whatever its type.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookingOutcome {
    #[serde(default)]
    pub error: Option<String>,
}

impl BookingOutcome {
    pub fn into_result(self) -> Result<(), WidgetError> {
        match self.error.filter(|e| !e.is_empty()) {
            Some(error) => Err(WidgetError::Api(error)),
            None => Ok(()),
        }
    }
}

/// Reply body served by the development booking endpoint.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BookingResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appointment_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
