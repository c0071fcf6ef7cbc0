//! Development stand-in for the booking backend, served from the widget host
//! when `STUB_API` is on.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;

use crate::models::{BookingResponse, SlotsResponse};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct SlotsQuery {
    pub date: Option<String>,
}

fn slots_error(message: String) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(SlotsResponse {
            available_slots: None,
            error: Some(message),
        }),
    )
        .into_response()
}

// GET /api/v1/available-slots/?date=YYYY-MM-DD
pub async fn available_slots(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SlotsQuery>,
) -> Response {
    let Some(raw) = query.date.filter(|d| !d.trim().is_empty()) else {
        return slots_error("Date parameter is required".to_string());
    };

    let date = match NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
        Ok(d) => d,
        Err(e) => return slots_error(format!("invalid date {raw:?}: {e}")),
    };

    Json(SlotsResponse {
        available_slots: Some(state.appointments.available_slots(date)),
        error: None,
    })
    .into_response()
}

#[derive(Deserialize, Default)]
pub struct BookAppointmentBody {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub time_slot: Option<String>,
}

fn booking_error(message: String) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(BookingResponse {
            error: Some(message),
            ..Default::default()
        }),
    )
        .into_response()
}

// POST /api/v1/book-appointment/
pub async fn book_appointment(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<BookAppointmentBody>, JsonRejection>,
) -> Response {
    let body = match payload {
        Ok(Json(body)) => body,
        Err(rejection) => {
            tracing::warn!(error = %rejection, "unreadable booking body");
            return booking_error(rejection.body_text());
        }
    };

    let result = state.appointments.book(
        body.name.as_deref().unwrap_or(""),
        body.phone_number.as_deref().unwrap_or(""),
        body.date.as_deref().unwrap_or(""),
        body.time_slot.as_deref().unwrap_or(""),
    );

    match result {
        Ok(appointment) => Json(BookingResponse {
            success: Some(true),
            message: Some("Appointment booked successfully".to_string()),
            appointment_id: Some(appointment.id),
            error: None,
        })
        .into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "booking rejected");
            booking_error(e.to_string())
        }
    }
}
