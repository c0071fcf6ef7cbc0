use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use uuid::Uuid;

use crate::errors::WidgetError;
use crate::models::booking::parse_date;
use crate::services::host::{self, HostDocument};
use crate::services::widget::BookingWidget;
use crate::state::{AppState, WidgetSession};

pub const SESSION_HEADER: &str = "x-widget-session";

const SESSION_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Browser glue for the host page: posts form events to `/widget/:id/*`,
/// swaps in the returned markup and hides expired status messages.
static HOST_SCRIPT: &str = include_str!("../web/host.js");

fn mount_widget(state: &AppState, document: &mut HostDocument) -> Result<BookingWidget, WidgetError> {
    let mount_point_id = &state.config.mount_point_id;
    let today = chrono::Local::now().date_naive();
    host::init_with_api(document, mount_point_id, Arc::clone(&state.api), today)
        .map(|w| w.with_message_ttl(state.config.message_ttl()))
        .ok_or_else(|| WidgetError::MountPointNotFound(mount_point_id.clone()))
}

fn store_session(state: &AppState, widget: BookingWidget) -> Uuid {
    let id = Uuid::new_v4();
    let now = Instant::now();
    let mut sessions = state.sessions.lock().unwrap_or_else(|e| e.into_inner());

    let before = sessions.len();
    sessions.retain(|_, s| now.saturating_duration_since(s.last_seen) < SESSION_IDLE_TIMEOUT);
    if sessions.len() < before {
        tracing::debug!(dropped = before - sessions.len(), "pruned idle widget sessions");
    }

    sessions.insert(
        id,
        WidgetSession {
            widget,
            last_seen: now,
        },
    );
    tracing::info!(session = %id, "widget session created");
    id
}

/// Runs `f` against the session's widget. The session lock is released
/// before this returns, so callers may await between calls.
fn with_widget<T>(
    state: &AppState,
    raw_id: &str,
    f: impl FnOnce(&mut BookingWidget) -> Result<T, WidgetError>,
) -> Result<T, WidgetError> {
    let id = Uuid::parse_str(raw_id).map_err(|_| WidgetError::SessionNotFound)?;
    let mut sessions = state.sessions.lock().unwrap_or_else(|e| e.into_inner());
    let session = sessions.get_mut(&id).ok_or(WidgetError::SessionNotFound)?;
    session.last_seen = Instant::now();
    f(&mut session.widget)
}

fn markup(state: &AppState, raw_id: &str) -> Result<Html<String>, WidgetError> {
    with_widget(state, raw_id, |w| Ok(Html(w.render(Instant::now()))))
}

// GET /
pub async fn host_page(State(state): State<Arc<AppState>>) -> Result<Response, WidgetError> {
    let mut document = HostDocument::new(state.config.api_base_url.clone())
        .with_mount_point(state.config.mount_point_id.clone());
    let widget = mount_widget(&state, &mut document)?;
    let id = store_session(&state, widget);

    let boot = serde_json::json!({
        "session": id.to_string(),
        "mountPoint": state.config.mount_point_id,
    });
    document.append_script(&format!("window.bookingWidget = {boot};"));
    document.append_script(HOST_SCRIPT);

    Ok(([(SESSION_HEADER, id.to_string())], Html(document.to_html())).into_response())
}

// POST /widget/sessions
#[derive(Serialize)]
pub struct SessionCreated {
    pub session_id: String,
    pub html: String,
}

pub async fn create_session(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SessionCreated>, WidgetError> {
    let mut document = HostDocument::new(state.config.api_base_url.clone())
        .with_mount_point(state.config.mount_point_id.clone());
    let widget = mount_widget(&state, &mut document)?;
    let html = widget.render(Instant::now());
    let id = store_session(&state, widget);

    Ok(Json(SessionCreated {
        session_id: id.to_string(),
        html,
    }))
}

// GET /widget/:id
pub async fn get_widget(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Html<String>, WidgetError> {
    markup(&state, &id)
}

// POST /widget/:id/fields
#[derive(Deserialize)]
pub struct FieldsUpdate {
    pub name: Option<String>,
    pub phone_number: Option<String>,
}

pub async fn update_fields(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<FieldsUpdate>,
) -> Result<Html<String>, WidgetError> {
    with_widget(&state, &id, |w| {
        if let Some(name) = payload.name {
            w.set_name(name)?;
        }
        if let Some(phone_number) = payload.phone_number {
            w.set_phone_number(phone_number)?;
        }
        Ok(Html(w.render(Instant::now())))
    })
}

// POST /widget/:id/date
#[derive(Deserialize)]
pub struct DateChange {
    #[serde(default)]
    pub date: String,
}

pub async fn change_date(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<DateChange>,
) -> Result<Html<String>, WidgetError> {
    let date = match payload.date.trim() {
        "" => None,
        raw => Some(parse_date(raw)?),
    };

    let pending = with_widget(&state, &id, |w| {
        Ok(w.change_date(date)?.map(|fetch| (fetch, w.api())))
    })?;

    if let Some((fetch, api)) = pending {
        let result = api.available_slots(fetch.date).await;
        with_widget(&state, &id, |w| {
            if !w.apply_slots(fetch, result) {
                tracing::debug!(session = %id, "slot response superseded by a newer date");
            }
            Ok(())
        })?;
    }

    markup(&state, &id)
}

// POST /widget/:id/slot
#[derive(Deserialize)]
pub struct SlotClick {
    pub slot: String,
}

pub async fn click_slot(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<SlotClick>,
) -> Result<Html<String>, WidgetError> {
    with_widget(&state, &id, |w| {
        w.click_slot(&payload.slot)?;
        Ok(Html(w.render(Instant::now())))
    })
}

// POST /widget/:id/submit
pub async fn submit(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Html<String>, WidgetError> {
    // Validation failures are rendered as a status message, not an HTTP error.
    let pending = with_widget(&state, &id, |w| match w.begin_submit() {
        Ok(submission) => Ok(Some((submission, w.api()))),
        Err(WidgetError::Validation(_)) => Ok(None),
        Err(e) => Err(e),
    })?;

    if let Some((submission, api)) = pending {
        let result = api.book(&submission.request).await;
        with_widget(&state, &id, |w| {
            w.apply_booking(submission, result);
            Ok(())
        })?;
    }

    markup(&state, &id)
}
