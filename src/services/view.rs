use std::fmt::Write;

use tokio::time::Instant;

use crate::models::UiState;
use crate::services::widget::BookingWidget;

pub const SELECT_DATE_PROMPT: &str = "Select a date to see available time slots";
pub const LOADING_TEXT: &str = "Loading available slots...";
pub const NO_SLOTS_TEXT: &str = "No available slots for this date";

/// Renders the widget markup. Output depends only on the widget state and `now`.
pub fn render(widget: &BookingWidget, now: Instant) -> String {
    let form = widget.form();
    let state = widget.state();
    let date_value = form
        .date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default();

    let mut html = String::with_capacity(2048);
    let _ = write!(
        html,
        r#"<div class="booking-container" data-state="{state_name}">
<div class="booking-header"><h2>Book an Appointment</h2></div>
<form id="booking-form">
<div class="booking-form-group">
<label class="booking-label" for="booking-name">Name</label>
<input class="booking-input" type="text" id="booking-name" name="name" value="{name}" required>
</div>
<div class="booking-form-group">
<label class="booking-label" for="booking-phone">Phone Number</label>
<input class="booking-input" type="tel" id="booking-phone" name="phone_number" pattern="[0-9+]+" value="{phone}" required>
</div>
<div class="booking-form-group">
<label class="booking-label" for="booking-date">Date</label>
<input class="booking-input" type="date" id="booking-date" name="date" min="{min}" value="{date_value}" required>
</div>
<div class="booking-form-group">
<label class="booking-label">Available Time Slots</label>
<div id="booking-available-slots" class="booking-slots">{slots}</div>
<input type="hidden" id="booking-time-slot" name="time_slot" value="{selected}">
</div>
<button type="submit" class="booking-btn" id="booking-submit-btn"{disabled}>{label}</button>
</form>
{message}
</div>"#,
        state_name = state.as_str(),
        name = escape(&form.name),
        phone = escape(&form.phone_number),
        min = widget.today().format("%Y-%m-%d"),
        slots = render_slot_area(state),
        selected = escape(state.selected_slot().unwrap_or("")),
        disabled = if widget.submit_enabled() { "" } else { " disabled" },
        label = widget.submit_label(),
        message = render_message(widget, now),
    );
    html
}

fn render_slot_area(state: &UiState) -> String {
    match state {
        UiState::NoDateSelected | UiState::BookingSucceeded => paragraph(SELECT_DATE_PROMPT),
        UiState::LoadingSlots { .. } => paragraph(LOADING_TEXT),
        UiState::NoSlotsAvailable { .. } => paragraph(NO_SLOTS_TEXT),
        UiState::SlotsFailed { error, .. } => paragraph(&format!("Error: {error}")),
        UiState::SlotsAvailable { slots, .. }
        | UiState::SlotChosen { slots, .. }
        | UiState::Submitting { slots, .. }
        | UiState::BookingFailed { slots, .. } => {
            let selected = state.selected_slot();
            slots
                .iter()
                .map(|slot| {
                    let mut class = String::from("booking-slot");
                    if selected == Some(slot.label.as_str()) {
                        class.push_str(" selected");
                    }
                    if slot.disabled {
                        class.push_str(" disabled");
                    }
                    let label = escape(&slot.label);
                    format!(r#"<div class="{class}" data-slot="{label}">{label}</div>"#)
                })
                .collect()
        }
    }
}

fn render_message(widget: &BookingWidget, now: Instant) -> String {
    match widget.visible_message(now) {
        Some(msg) => format!(
            r#"<div id="booking-message" class="booking-message {class}" data-expires-in-ms="{ms}">{text}</div>"#,
            class = msg.kind.css_class(),
            ms = msg.remaining(now, widget.message_ttl()).as_millis(),
            text = escape(&msg.text),
        ),
        None => r#"<div id="booking-message" class="booking-message" style="display: none;"></div>"#
            .to_string(),
    }
}

fn paragraph(text: &str) -> String {
    format!("<p>{}</p>", escape(text))
}

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
