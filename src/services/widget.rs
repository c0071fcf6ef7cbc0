use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use tokio::time::Instant;

use crate::errors::WidgetError;
use crate::models::{BookingForm, BookingRequest, MessageKind, SlotSet, StatusMessage, UiState};
use crate::services::api::BookingApi;
use crate::services::host::HostDocument;
use crate::services::view;

pub const SUBMIT_LABEL: &str = "Book Appointment";
pub const SUBMITTING_LABEL: &str = "Booking...";
pub const BOOKED_MESSAGE: &str = "Appointment booked successfully!";
pub const DEFAULT_MESSAGE_TTL: Duration = Duration::from_secs(5);

/// Issued by [`BookingWidget::change_date`]; hand it back with the fetch result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotFetch {
    pub date: NaiveDate,
    pub generation: u64,
}

/// Issued by [`BookingWidget::begin_submit`]; hand it back with the booking result.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub request: BookingRequest,
    pub generation: u64,
}

/// Controller for one mounted booking form.
///
/// State transitions are synchronous. Network calls are split out through
/// [`SlotFetch`] and [`Submission`] tickets so a caller can run them without
/// holding the widget, and responses for superseded requests are dropped.
pub struct BookingWidget {
    api: Arc<dyn BookingApi>,
    mount_point_id: String,
    today: NaiveDate,
    form: BookingForm,
    state: UiState,
    message: Option<StatusMessage>,
    message_ttl: Duration,
    generation: u64,
}

impl BookingWidget {
    pub fn new(api: Arc<dyn BookingApi>, mount_point_id: impl Into<String>, today: NaiveDate) -> Self {
        Self {
            api,
            mount_point_id: mount_point_id.into(),
            today,
            form: BookingForm::default(),
            state: UiState::NoDateSelected,
            message: None,
            message_ttl: DEFAULT_MESSAGE_TTL,
            generation: 0,
        }
    }

    pub fn with_message_ttl(mut self, ttl: Duration) -> Self {
        self.message_ttl = ttl;
        self
    }

    pub fn api(&self) -> Arc<dyn BookingApi> {
        Arc::clone(&self.api)
    }

    pub fn mount_point_id(&self) -> &str {
        &self.mount_point_id
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn form(&self) -> &BookingForm {
        &self.form
    }

    pub fn state(&self) -> &UiState {
        &self.state
    }

    pub fn submit_enabled(&self) -> bool {
        self.state.submit_enabled()
    }

    pub fn submit_label(&self) -> &'static str {
        if self.state.is_submitting() {
            SUBMITTING_LABEL
        } else {
            SUBMIT_LABEL
        }
    }

    pub fn message_ttl(&self) -> Duration {
        self.message_ttl
    }

    /// The status message, if it is still inside its display window at `now`.
    pub fn visible_message(&self, now: Instant) -> Option<&StatusMessage> {
        self.message
            .as_ref()
            .filter(|m| m.is_visible(now, self.message_ttl))
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> Result<(), WidgetError> {
        self.ensure_idle()?;
        self.form.name = name.into();
        Ok(())
    }

    pub fn set_phone_number(&mut self, phone_number: impl Into<String>) -> Result<(), WidgetError> {
        self.ensure_idle()?;
        self.form.phone_number = phone_number.into();
        Ok(())
    }

    /// Records a new date and returns the fetch to run for it. Any previous
    /// selection is dropped and any in-flight fetch becomes stale.
    pub fn change_date(&mut self, date: Option<NaiveDate>) -> Result<Option<SlotFetch>, WidgetError> {
        self.ensure_idle()?;

        self.form.date = date;
        self.generation += 1;

        match date {
            None => {
                self.state = UiState::NoDateSelected;
                Ok(None)
            }
            Some(date) => {
                tracing::debug!(%date, generation = self.generation, "fetching available slots");
                self.state = UiState::LoadingSlots { date };
                Ok(Some(SlotFetch {
                    date,
                    generation: self.generation,
                }))
            }
        }
    }

    /// Applies a slot fetch result. Returns `false` when the fetch was
    /// superseded by a later date change and the result was dropped.
    pub fn apply_slots(&mut self, fetch: SlotFetch, result: Result<SlotSet, WidgetError>) -> bool {
        let current = fetch.generation == self.generation
            && matches!(self.state, UiState::LoadingSlots { date } if date == fetch.date);
        if !current {
            tracing::debug!(
                date = %fetch.date,
                generation = fetch.generation,
                current = self.generation,
                "discarding stale slot response"
            );
            return false;
        }

        let date = fetch.date;
        self.state = match result {
            Ok(slots) if slots.is_empty() => UiState::NoSlotsAvailable { date },
            Ok(slots) => {
                tracing::debug!(%date, count = slots.len(), "slots loaded");
                UiState::SlotsAvailable { date, slots }
            }
            Err(e) => {
                tracing::warn!(%date, error = %e, "failed to load available slots");
                UiState::SlotsFailed {
                    date,
                    error: e.to_string(),
                }
            }
        };
        true
    }

    /// Changes the date and loads its slots.
    pub async fn select_date(&mut self, date: Option<NaiveDate>) -> Result<(), WidgetError> {
        if let Some(fetch) = self.change_date(date)? {
            let api = self.api();
            let result = api.available_slots(fetch.date).await;
            self.apply_slots(fetch, result);
        }
        Ok(())
    }

    pub fn click_slot(&mut self, label: &str) -> Result<(), WidgetError> {
        let (date, slots) = match &self.state {
            UiState::SlotsAvailable { date, slots }
            | UiState::SlotChosen { date, slots, .. }
            | UiState::BookingFailed { date, slots, .. } => (*date, slots),
            UiState::Submitting { .. } => return Err(WidgetError::Busy),
            _ => return Err(WidgetError::SlotNotOffered(label.to_string())),
        };

        let slot = slots
            .get(label)
            .ok_or_else(|| WidgetError::SlotNotOffered(label.to_string()))?;
        if slot.disabled {
            return Err(WidgetError::SlotDisabled(label.to_string()));
        }

        let slots = slots.clone();
        self.state = UiState::SlotChosen {
            date,
            slots,
            slot: label.to_string(),
        };
        Ok(())
    }

    /// Validates the form and moves to `Submitting`. On a validation failure
    /// the error is shown as a status message and nothing is sent.
    pub fn begin_submit(&mut self) -> Result<Submission, WidgetError> {
        let (date, slots, slot) = match &self.state {
            UiState::SlotChosen { date, slots, slot }
            | UiState::BookingFailed { date, slots, slot, .. } => (*date, slots.clone(), slot.clone()),
            UiState::Submitting { .. } => return Err(WidgetError::Busy),
            _ => return Err(WidgetError::NoSlotSelected),
        };

        let request = match self.form.validate(self.today, &slot) {
            Ok(request) => request,
            Err(e) => {
                self.show_message(e.user_message(), MessageKind::Error);
                return Err(e);
            }
        };

        tracing::info!(date = %date, time_slot = %slot, "submitting booking");
        self.state = UiState::Submitting { date, slots, slot };
        Ok(Submission {
            request,
            generation: self.generation,
        })
    }

    /// Applies the booking outcome. Returns `false` if no matching
    /// submission is in flight.
    pub fn apply_booking(&mut self, submission: Submission, result: Result<(), WidgetError>) -> bool {
        if submission.generation != self.generation {
            tracing::debug!(generation = submission.generation, "discarding stale booking response");
            return false;
        }

        let (date, slots, slot) = match std::mem::replace(&mut self.state, UiState::BookingSucceeded) {
            UiState::Submitting { date, slots, slot } => (date, slots, slot),
            other => {
                self.state = other;
                return false;
            }
        };

        match result {
            Ok(()) => {
                tracing::info!(date = %date, time_slot = %slot, "appointment booked");
                self.show_message(BOOKED_MESSAGE, MessageKind::Success);
                self.form.clear();
                self.generation += 1;
            }
            Err(e) => {
                tracing::warn!(date = %date, time_slot = %slot, error = %e, "booking failed");
                let error = e.user_message();
                self.show_message(error.clone(), MessageKind::Error);
                self.state = UiState::BookingFailed {
                    date,
                    slots,
                    slot,
                    error,
                };
            }
        }
        true
    }

    /// Runs the whole submit round trip. Errors are returned only when no
    /// request was sent.
    pub async fn submit(&mut self) -> Result<(), WidgetError> {
        let submission = self.begin_submit()?;
        let api = self.api();
        let result = api.book(&submission.request).await;
        self.apply_booking(submission, result);
        Ok(())
    }

    pub fn render(&self, now: Instant) -> String {
        view::render(self, now)
    }

    /// Replaces the mount point's contents with the current markup.
    pub fn render_into(&self, document: &mut HostDocument) -> Result<(), WidgetError> {
        document.replace_contents(&self.mount_point_id, self.render(Instant::now()))
    }

    fn show_message(&mut self, text: impl Into<String>, kind: MessageKind) {
        self.message = Some(StatusMessage::new(text, kind));
    }

    fn ensure_idle(&self) -> Result<(), WidgetError> {
        if self.state.is_submitting() {
            return Err(WidgetError::Busy);
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    pub(crate) struct MockApi {
        slots: Mutex<HashMap<NaiveDate, Result<SlotSet, WidgetError>>>,
        booking: Mutex<Result<(), WidgetError>>,
        pub(crate) slot_calls: Mutex<Vec<NaiveDate>>,
        pub(crate) bookings: Mutex<Vec<BookingRequest>>,
    }

    impl MockApi {
        pub(crate) fn new() -> Self {
            Self {
                slots: Mutex::new(HashMap::new()),
                booking: Mutex::new(Ok(())),
                slot_calls: Mutex::new(vec![]),
                bookings: Mutex::new(vec![]),
            }
        }

        pub(crate) fn with_slots(self, date: NaiveDate, labels: &[&str]) -> Self {
            self.slots
                .lock()
                .unwrap()
                .insert(date, Ok(SlotSet::from_labels(labels.iter().copied())));
            self
        }

        pub(crate) fn with_slot_error(self, date: NaiveDate, err: WidgetError) -> Self {
            self.slots.lock().unwrap().insert(date, Err(err));
            self
        }

        pub(crate) fn with_booking_result(self, result: Result<(), WidgetError>) -> Self {
            *self.booking.lock().unwrap() = result;
            self
        }
    }

    #[async_trait]
    impl BookingApi for MockApi {
        async fn available_slots(&self, date: NaiveDate) -> Result<SlotSet, WidgetError> {
            self.slot_calls.lock().unwrap().push(date);
            self.slots
                .lock()
                .unwrap()
                .get(&date)
                .cloned()
                .unwrap_or_else(|| Ok(SlotSet::default()))
        }

        async fn book(&self, request: &BookingRequest) -> Result<(), WidgetError> {
            self.bookings.lock().unwrap().push(request.clone());
            self.booking.lock().unwrap().clone()
        }
    }

    pub(crate) fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn widget(api: MockApi) -> (BookingWidget, Arc<MockApi>) {
        let api = Arc::new(api);
        let widget = BookingWidget::new(api.clone(), "booking", date("2024-05-01"));
        (widget, api)
    }

    fn june_first() -> MockApi {
        MockApi::new().with_slots(date("2024-06-01"), &["09:00", "10:00"])
    }

    async fn ready_to_submit(api: MockApi) -> (BookingWidget, Arc<MockApi>) {
        let (mut w, api) = widget(api);
        w.set_name("A").unwrap();
        w.set_phone_number("123").unwrap();
        w.select_date(Some(date("2024-06-01"))).await.unwrap();
        w.click_slot("09:00").unwrap();
        (w, api)
    }

    #[tokio::test]
    async fn test_two_slots_render_and_submit_waits_for_click() {
        let (mut w, _api) = widget(june_first());
        w.select_date(Some(date("2024-06-01"))).await.unwrap();

        assert_eq!(w.state().slots().map(|s| s.len()), Some(2));
        assert!(!w.submit_enabled());

        w.click_slot("09:00").unwrap();
        assert!(w.submit_enabled());
        assert_eq!(w.state().selected_slot(), Some("09:00"));
    }

    #[tokio::test]
    async fn test_date_change_triggers_exactly_one_fetch() {
        let (mut w, api) = widget(june_first());
        w.select_date(Some(date("2024-06-01"))).await.unwrap();
        assert_eq!(*api.slot_calls.lock().unwrap(), vec![date("2024-06-01")]);
    }

    #[tokio::test]
    async fn test_clearing_date_does_not_fetch() {
        let (mut w, api) = widget(june_first());
        w.select_date(None).await.unwrap();
        assert!(api.slot_calls.lock().unwrap().is_empty());
        assert_eq!(w.state(), &UiState::NoDateSelected);
    }

    #[tokio::test]
    async fn test_empty_slot_list() {
        let (mut w, _api) = widget(MockApi::new().with_slots(date("2024-06-01"), &[]));
        w.select_date(Some(date("2024-06-01"))).await.unwrap();
        assert_eq!(
            w.state(),
            &UiState::NoSlotsAvailable {
                date: date("2024-06-01")
            }
        );
        assert!(!w.submit_enabled());
    }

    #[tokio::test]
    async fn test_fetch_failure_disables_submit() {
        let (mut w, _api) = widget(
            MockApi::new().with_slot_error(date("2024-06-01"), WidgetError::Api("closed".into())),
        );
        w.select_date(Some(date("2024-06-01"))).await.unwrap();
        assert!(matches!(w.state(), UiState::SlotsFailed { error, .. } if error == "closed"));
        assert!(!w.submit_enabled());
    }

    #[test]
    fn test_loading_disables_submit() {
        let (mut w, _api) = widget(june_first());
        let fetch = w.change_date(Some(date("2024-06-01"))).unwrap().unwrap();
        assert_eq!(fetch.date, date("2024-06-01"));
        assert_eq!(w.state().as_str(), "loading_slots");
        assert!(!w.submit_enabled());
    }

    #[tokio::test]
    async fn test_clicking_another_slot_moves_selection() {
        let (mut w, _api) = widget(june_first());
        w.select_date(Some(date("2024-06-01"))).await.unwrap();
        w.click_slot("09:00").unwrap();
        w.click_slot("10:00").unwrap();
        assert_eq!(w.state().selected_slot(), Some("10:00"));
        assert!(w.submit_enabled());
    }

    #[tokio::test]
    async fn test_unknown_and_disabled_slots_rejected() {
        let (mut w, _api) = widget(june_first());
        w.select_date(Some(date("2024-06-01"))).await.unwrap();

        assert_eq!(
            w.click_slot("23:00"),
            Err(WidgetError::SlotNotOffered("23:00".to_string()))
        );
        assert!(!w.submit_enabled());

        let fetch = w.change_date(Some(date("2024-06-01"))).unwrap().unwrap();
        w.apply_slots(fetch, Ok(SlotSet::from_labels(["09:00", "10:00"]).with_disabled("10:00")));
        assert_eq!(
            w.click_slot("10:00"),
            Err(WidgetError::SlotDisabled("10:00".to_string()))
        );
        assert_eq!(w.state().selected_slot(), None);
    }

    #[tokio::test]
    async fn test_date_change_clears_selection() {
        let (mut w, _api) = ready_to_submit(june_first()).await;
        assert!(w.submit_enabled());

        w.change_date(Some(date("2024-06-02"))).unwrap();
        assert_eq!(w.state().selected_slot(), None);
        assert!(!w.submit_enabled());
        assert_eq!(w.click_slot("09:00"), Err(WidgetError::SlotNotOffered("09:00".into())));
    }

    #[test]
    fn test_stale_slot_response_discarded() {
        let (mut w, _api) = widget(MockApi::new());
        let first = w.change_date(Some(date("2024-06-01"))).unwrap().unwrap();
        let second = w.change_date(Some(date("2024-06-02"))).unwrap().unwrap();

        // older response lands after the newer one
        assert!(w.apply_slots(second, Ok(SlotSet::from_labels(["11:00"]))));
        assert!(!w.apply_slots(first, Ok(SlotSet::from_labels(["09:00"]))));

        assert_eq!(w.state().date(), Some(date("2024-06-02")));
        assert!(w.state().slots().unwrap().contains("11:00"));
        assert!(!w.state().slots().unwrap().contains("09:00"));
    }

    #[test]
    fn test_stale_response_before_current_one() {
        let (mut w, _api) = widget(MockApi::new());
        let first = w.change_date(Some(date("2024-06-01"))).unwrap().unwrap();
        let _second = w.change_date(Some(date("2024-06-02"))).unwrap().unwrap();

        assert!(!w.apply_slots(first, Ok(SlotSet::from_labels(["09:00"]))));
        assert_eq!(
            w.state(),
            &UiState::LoadingSlots {
                date: date("2024-06-02")
            }
        );
    }

    #[test]
    fn test_same_date_refetch_drops_older_ticket() {
        let (mut w, _api) = widget(MockApi::new());
        let first = w.change_date(Some(date("2024-06-01"))).unwrap().unwrap();
        let second = w.change_date(Some(date("2024-06-01"))).unwrap().unwrap();
        assert_ne!(first.generation, second.generation);
        assert!(!w.apply_slots(first, Ok(SlotSet::from_labels(["09:00"]))));
        assert!(w.apply_slots(second, Ok(SlotSet::from_labels(["10:00"]))));
    }

    #[tokio::test]
    async fn test_successful_booking_clears_form() {
        let (mut w, api) = ready_to_submit(june_first()).await;
        w.submit().await.unwrap();

        let sent = api.bookings.lock().unwrap().clone();
        assert_eq!(
            serde_json::to_value(&sent[0]).unwrap(),
            serde_json::json!({
                "name": "A",
                "phone_number": "123",
                "date": "2024-06-01",
                "time_slot": "09:00"
            })
        );

        assert_eq!(w.state(), &UiState::BookingSucceeded);
        assert_eq!(w.form(), &BookingForm::default());
        assert!(!w.submit_enabled());
        assert_eq!(w.submit_label(), SUBMIT_LABEL);

        let msg = w.visible_message(Instant::now()).unwrap();
        assert_eq!(msg.text, BOOKED_MESSAGE);
        assert_eq!(msg.kind, MessageKind::Success);
    }

    #[tokio::test]
    async fn test_failed_booking_keeps_data_and_reenables() {
        let (mut w, _api) = ready_to_submit(
            june_first().with_booking_result(Err(WidgetError::Api("slot taken".into()))),
        )
        .await;
        w.submit().await.unwrap();

        let msg = w.visible_message(Instant::now()).unwrap();
        assert_eq!(msg.text, "slot taken");
        assert_eq!(msg.kind, MessageKind::Error);

        assert!(w.submit_enabled());
        assert_eq!(w.submit_label(), SUBMIT_LABEL);
        assert_eq!(w.form().name, "A");
        assert_eq!(w.form().phone_number, "123");
        assert_eq!(w.form().date, Some(date("2024-06-01")));
        assert_eq!(w.state().selected_slot(), Some("09:00"));
    }

    #[tokio::test]
    async fn test_transport_failure_on_submit() {
        let (mut w, _api) = ready_to_submit(
            june_first().with_booking_result(Err(WidgetError::Transport("connection reset".into()))),
        )
        .await;
        w.submit().await.unwrap();

        let msg = w.visible_message(Instant::now()).unwrap();
        assert_eq!(msg.text, "Error: connection reset");
        assert!(w.submit_enabled());
    }

    #[tokio::test]
    async fn test_retry_after_failure() {
        let (mut w, api) = ready_to_submit(
            june_first().with_booking_result(Err(WidgetError::Api("slot taken".into()))),
        )
        .await;
        w.submit().await.unwrap();
        w.click_slot("10:00").unwrap();
        *api.booking.lock().unwrap() = Ok(());
        w.submit().await.unwrap();

        assert_eq!(api.bookings.lock().unwrap().len(), 2);
        assert_eq!(api.bookings.lock().unwrap()[1].time_slot, "10:00");
        assert_eq!(w.state(), &UiState::BookingSucceeded);
    }

    #[tokio::test]
    async fn test_submitting_locks_the_form() {
        let (mut w, _api) = ready_to_submit(june_first()).await;
        let submission = w.begin_submit().unwrap();

        assert!(!w.submit_enabled());
        assert_eq!(w.submit_label(), SUBMITTING_LABEL);
        assert_eq!(w.begin_submit(), Err(WidgetError::Busy));
        assert_eq!(w.click_slot("10:00"), Err(WidgetError::Busy));
        assert_eq!(w.change_date(None), Err(WidgetError::Busy));
        assert_eq!(w.set_name("B"), Err(WidgetError::Busy));

        assert!(w.apply_booking(submission.clone(), Ok(())));
        // a second outcome for the same ticket is ignored
        assert!(!w.apply_booking(submission, Ok(())));
    }

    #[tokio::test]
    async fn test_invalid_form_sends_nothing() {
        let (mut w, api) = ready_to_submit(june_first()).await;
        w.set_phone_number("call me").unwrap();

        let err = w.submit().await.unwrap_err();
        assert!(matches!(err, WidgetError::Validation(_)));
        assert!(api.bookings.lock().unwrap().is_empty());
        assert_eq!(w.state().as_str(), "slot_chosen");
        assert_eq!(
            w.visible_message(Instant::now()).map(|m| m.kind),
            Some(MessageKind::Error)
        );
    }

    #[tokio::test]
    async fn test_past_date_rejected_on_submit() {
        let api = MockApi::new().with_slots(date("2024-04-01"), &["09:00"]);
        let (mut w, api) = widget(api);
        w.set_name("A").unwrap();
        w.set_phone_number("123").unwrap();
        w.select_date(Some(date("2024-04-01"))).await.unwrap();
        w.click_slot("09:00").unwrap();

        assert!(w.submit().await.is_err());
        assert!(api.bookings.lock().unwrap().is_empty());
    }

    #[test]
    fn test_submit_without_slot() {
        let (mut w, _api) = widget(MockApi::new());
        assert_eq!(w.begin_submit(), Err(WidgetError::NoSlotSelected));
        assert!(w.visible_message(Instant::now()).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_message_hidden_after_five_seconds() {
        let (mut w, _api) = ready_to_submit(june_first()).await;
        w.submit().await.unwrap();
        assert!(w.visible_message(Instant::now()).is_some());

        tokio::time::advance(Duration::from_millis(4_900)).await;
        assert!(w.visible_message(Instant::now()).is_some());

        tokio::time::advance(Duration::from_millis(100)).await;
        assert!(w.visible_message(Instant::now()).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_message_restarts_window() {
        let (mut w, _api) = ready_to_submit(
            june_first().with_booking_result(Err(WidgetError::Api("slot taken".into()))),
        )
        .await;
        w.submit().await.unwrap();
        tokio::time::advance(Duration::from_secs(4)).await;

        w.submit().await.unwrap();
        tokio::time::advance(Duration::from_secs(4)).await;
        assert!(w.visible_message(Instant::now()).is_some());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(w.visible_message(Instant::now()).is_none());
    }
}
