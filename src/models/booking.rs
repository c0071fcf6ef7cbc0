use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::WidgetError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Body of `POST /api/v1/book-appointment/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookingRequest {
    pub name: String,
    pub phone_number: String,
    pub date: NaiveDate,
    pub time_slot: String,
}

/// The editable fields of the booking form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookingForm {
    pub name: String,
    pub phone_number: String,
    pub date: Option<NaiveDate>,
}

impl BookingForm {
    pub fn clear(&mut self) {
        *self = BookingForm::default();
    }

    /// Applies the form's native constraints (required, phone pattern,
    /// `min` date) and builds the request for the chosen slot. Values are
    /// checked and sent as typed: `required` only rejects an empty value,
    /// and the phone pattern must match the whole value.
    pub fn validate(&self, today: NaiveDate, time_slot: &str) -> Result<BookingRequest, WidgetError> {
        let name = self.name.as_str();
        if name.is_empty() {
            return Err(WidgetError::Validation("Please enter your name".to_string()));
        }

        let phone = self.phone_number.as_str();
        if phone.is_empty() {
            return Err(WidgetError::Validation(
                "Please enter your phone number".to_string(),
            ));
        }
        if !is_valid_phone(phone) {
            return Err(WidgetError::Validation(
                "Phone number may only contain digits and '+'".to_string(),
            ));
        }

        let date = self
            .date
            .ok_or_else(|| WidgetError::Validation("Please choose a date".to_string()))?;
        if date < today {
            return Err(WidgetError::Validation(format!(
                "Date must be {} or later",
                today.format("%Y-%m-%d")
            )));
        }

        if time_slot.is_empty() {
            return Err(WidgetError::NoSlotSelected);
        }

        Ok(BookingRequest {
            name: name.to_string(),
            phone_number: phone.to_string(),
            date,
            time_slot: time_slot.to_string(),
        })
    }
}

/// Mirrors the `[0-9+]+` pattern on the phone input.
pub fn is_valid_phone(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit() || c == '+')
}

pub fn parse_date(s: &str) -> Result<NaiveDate, WidgetError> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|e| WidgetError::Validation(format!("invalid date {s:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn filled_form() -> BookingForm {
        BookingForm {
            name: "A".to_string(),
            phone_number: "123".to_string(),
            date: Some(date("2024-06-01")),
        }
    }

    #[test]
    fn test_validate_builds_request() {
        let req = filled_form().validate(date("2024-05-30"), "09:00").unwrap();
        assert_eq!(req.name, "A");
        assert_eq!(req.phone_number, "123");
        assert_eq!(req.date, date("2024-06-01"));
        assert_eq!(req.time_slot, "09:00");
    }

    #[test]
    fn test_request_wire_format() {
        let req = filled_form().validate(date("2024-05-30"), "09:00").unwrap();
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "A",
                "phone_number": "123",
                "date": "2024-06-01",
                "time_slot": "09:00"
            })
        );
    }

    #[test]
    fn test_validate_requires_name() {
        let mut form = filled_form();
        form.name = String::new();
        assert!(matches!(
            form.validate(date("2024-05-30"), "09:00"),
            Err(WidgetError::Validation(_))
        ));
    }

    #[test]
    fn test_validate_matches_native_required() {
        // `required` only rejects an empty value
        let mut form = filled_form();
        form.name = "   ".to_string();
        let req = form.validate(date("2024-05-30"), "09:00").unwrap();
        assert_eq!(req.name, "   ");
    }

    #[test]
    fn test_validate_phone_pattern() {
        let mut form = filled_form();
        form.phone_number = "555-1234".to_string();
        assert!(form.validate(date("2024-05-30"), "09:00").is_err());

        form.phone_number = " 123".to_string();
        assert!(form.validate(date("2024-05-30"), "09:00").is_err());

        form.phone_number = "+15551234".to_string();
        assert!(form.validate(date("2024-05-30"), "09:00").is_ok());
    }

    #[test]
    fn test_validate_date_not_in_past() {
        let form = filled_form();
        assert!(form.validate(date("2024-06-02"), "09:00").is_err());
        // today itself is allowed
        assert!(form.validate(date("2024-06-01"), "09:00").is_ok());
    }

    #[test]
    fn test_validate_requires_slot() {
        assert_eq!(
            filled_form().validate(date("2024-05-30"), ""),
            Err(WidgetError::NoSlotSelected)
        );
    }

    #[test]
    fn test_request_date_round_trips_iso() {
        let req: BookingRequest = serde_json::from_str(
            r#"{"name":"A","phone_number":"1","date":"2024-06-01","time_slot":"09:00"}"#,
        )
        .unwrap();
        assert_eq!(req.date, date("2024-06-01"));
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2024-06-01").unwrap(), date("2024-06-01"));
        assert!(parse_date("06/01/2024").is_err());
    }
}
