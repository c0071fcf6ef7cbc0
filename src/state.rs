use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::time::Instant;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::errors::WidgetError;
use crate::services::api::http::HttpBookingApi;
use crate::services::api::BookingApi;
use crate::services::schedule::AppointmentBook;
use crate::services::widget::BookingWidget;

pub struct WidgetSession {
    pub widget: BookingWidget,
    pub last_seen: Instant,
}

pub struct AppState {
    pub config: AppConfig,
    pub api: Arc<dyn BookingApi>,
    pub sessions: Mutex<HashMap<Uuid, WidgetSession>>,
    pub appointments: AppointmentBook,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self, WidgetError> {
        let api = HttpBookingApi::with_timeout(config.api_base_url.clone(), config.http_timeout())?;
        Ok(Self::with_api(config, Arc::new(api)))
    }

    pub fn with_api(config: AppConfig, api: Arc<dyn BookingApi>) -> Self {
        Self {
            config,
            api,
            sessions: Mutex::new(HashMap::new()),
            appointments: AppointmentBook::new(),
        }
    }
}
