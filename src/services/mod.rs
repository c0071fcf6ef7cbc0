pub mod api;
pub mod host;
pub mod schedule;
pub mod style;
pub mod view;
pub mod widget;
