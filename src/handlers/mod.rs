pub mod dev;
pub mod health;
pub mod widget;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use crate::services::api::{AVAILABLE_SLOTS_PATH, BOOK_APPOINTMENT_PATH};
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    let mut app = Router::new()
        .route("/health", get(health::health))
        .route("/", get(widget::host_page))
        .route("/widget/sessions", post(widget::create_session))
        .route("/widget/:id", get(widget::get_widget))
        .route("/widget/:id/fields", post(widget::update_fields))
        .route("/widget/:id/date", post(widget::change_date))
        .route("/widget/:id/slot", post(widget::click_slot))
        .route("/widget/:id/submit", post(widget::submit));

    if state.config.stub_api {
        app = app
            .route(AVAILABLE_SLOTS_PATH, get(dev::available_slots))
            .route(BOOK_APPOINTMENT_PATH, post(dev::book_appointment));
    }

    app.with_state(state)
}
