use std::sync::Mutex;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

pub const OPENING_HOUR: u32 = 10;
pub const CLOSING_HOUR: u32 = 17;
pub const LUNCH_HOUR: u32 = 13;
pub const SLOT_MINUTES: i64 = 30;
pub const SLOT_LABEL_FORMAT: &str = "%I:%M %p";

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ScheduleError {
    #[error("All fields are required")]
    MissingFields,

    #[error("{0}")]
    InvalidDate(String),

    #[error("This slot is already booked")]
    AlreadyBooked,
}

#[derive(Debug, Clone)]
pub struct Appointment {
    pub id: u64,
    pub name: String,
    pub phone_number: String,
    pub date: NaiveDate,
    pub time_slot: String,
    pub created_at: NaiveDateTime,
}

/// Every slot label of a working day: half-hour starts from opening to
/// closing, skipping the lunch hour.
pub fn daily_slots() -> Vec<String> {
    let mut slots = Vec::new();
    let mut current = NaiveTime::from_hms_opt(OPENING_HOUR, 0, 0).unwrap_or(NaiveTime::MIN);
    let end = NaiveTime::from_hms_opt(CLOSING_HOUR, 0, 0).unwrap_or(NaiveTime::MIN);

    while current < end {
        if current.hour() != LUNCH_HOUR {
            slots.push(current.format(SLOT_LABEL_FORMAT).to_string());
        }
        current += Duration::minutes(SLOT_MINUTES);
    }
    slots
}

/// In-memory appointment book backing the development API.
#[derive(Default)]
pub struct AppointmentBook {
    appointments: Mutex<Vec<Appointment>>,
}

impl AppointmentBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn available_slots(&self, date: NaiveDate) -> Vec<String> {
        let appointments = self.appointments.lock().unwrap_or_else(|e| e.into_inner());
        daily_slots()
            .into_iter()
            .filter(|slot| {
                !appointments
                    .iter()
                    .any(|a| a.date == date && &a.time_slot == slot)
            })
            .collect()
    }

    pub fn book(
        &self,
        name: &str,
        phone_number: &str,
        date: &str,
        time_slot: &str,
    ) -> Result<Appointment, ScheduleError> {
        if [name, phone_number, date, time_slot]
            .iter()
            .any(|f| f.trim().is_empty())
        {
            return Err(ScheduleError::MissingFields);
        }

        let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
            .map_err(|e| ScheduleError::InvalidDate(format!("invalid date {date:?}: {e}")))?;

        let mut appointments = self.appointments.lock().unwrap_or_else(|e| e.into_inner());
        if appointments
            .iter()
            .any(|a| a.date == date && a.time_slot == time_slot)
        {
            return Err(ScheduleError::AlreadyBooked);
        }

        let appointment = Appointment {
            id: appointments.len() as u64 + 1,
            name: name.to_string(),
            phone_number: phone_number.to_string(),
            date,
            time_slot: time_slot.to_string(),
            created_at: chrono::Utc::now().naive_utc(),
        };
        appointments.push(appointment.clone());

        tracing::info!(
            id = appointment.id,
            date = %appointment.date,
            time_slot = %appointment.time_slot,
            "appointment created"
        );
        Ok(appointment)
    }

    pub fn appointments(&self) -> Vec<Appointment> {
        self.appointments
            .lock()
            .map(|a| a.clone())
            .unwrap_or_default()
    }
}
