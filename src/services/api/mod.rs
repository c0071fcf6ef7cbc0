pub mod http;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::WidgetError;
use crate::models::{BookingRequest, SlotSet};

pub const AVAILABLE_SLOTS_PATH: &str = "/api/v1/available-slots/";
pub const BOOK_APPOINTMENT_PATH: &str = "/api/v1/book-appointment/";

/// The two calls the widget makes against the booking backend.
#[async_trait]
pub trait BookingApi: Send + Sync {
    async fn available_slots(&self, date: NaiveDate) -> Result<SlotSet, WidgetError>;
    async fn book(&self, request: &BookingRequest) -> Result<(), WidgetError>;
}
