pub mod booking;
pub mod slots;
pub mod ui_state;

pub use booking::{BookingForm, BookingRequest};
pub use slots::{BookingOutcome, BookingResponse, Slot, SlotSet, SlotsResponse};
pub use ui_state::{MessageKind, StatusMessage, UiState};
