use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;

use super::{BookingApi, AVAILABLE_SLOTS_PATH, BOOK_APPOINTMENT_PATH};
use crate::errors::WidgetError;
use crate::models::{BookingOutcome, BookingRequest, SlotSet, SlotsResponse};

pub struct HttpBookingApi {
    base_url: String,
    client: reqwest::Client,
}

impl HttpBookingApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, WidgetError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WidgetError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self::with_client(base_url, client))
    }

    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, client }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl BookingApi for HttpBookingApi {
    async fn available_slots(&self, date: NaiveDate) -> Result<SlotSet, WidgetError> {
        let date = date.format("%Y-%m-%d").to_string();

        // The status code is not consulted: error responses carry `{error}`.
        let body: SlotsResponse = self
            .client
            .get(format!("{}{AVAILABLE_SLOTS_PATH}", self.base_url))
            .query(&[("date", date.as_str())])
            .send()
            .await?
            .json()
            .await?;

        body.into_slot_set()
    }

    async fn book(&self, request: &BookingRequest) -> Result<(), WidgetError> {
        let body: BookingOutcome = self
            .client
            .post(format!("{}{BOOK_APPOINTMENT_PATH}", self.base_url))
            .json(request)
            .send()
            .await?
            .json()
            .await?;

        body.into_result()
    }
}
