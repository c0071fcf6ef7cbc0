use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WidgetError {
    /// Network failure or a response body that could not be parsed.
    #[error("{0}")]
    Transport(String),

    /// The booking API answered with an `error` field.
    #[error("{0}")]
    Api(String),

    #[error("element with id \"{0}\" not found")]
    MountPointNotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("time slot {0} is not offered for the selected date")]
    SlotNotOffered(String),

    #[error("time slot {0} is unavailable")]
    SlotDisabled(String),

    #[error("no time slot selected")]
    NoSlotSelected,

    #[error("a booking is already in progress")]
    Busy,

    #[error("widget session not found")]
    SessionNotFound,

    #[error("configuration error: {0}")]
    Config(String),
}

impl WidgetError {
    /// Text shown to the user when this error ends a workflow step.
    /// API and validation errors are shown verbatim; everything else gets
    /// an `Error:` prefix.
    pub fn user_message(&self) -> String {
        match self {
            WidgetError::Api(msg) | WidgetError::Validation(msg) => msg.clone(),
            other => format!("Error: {other}"),
        }
    }
}

impl From<reqwest::Error> for WidgetError {
    fn from(err: reqwest::Error) -> Self {
        WidgetError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for WidgetError {
    fn from(err: serde_json::Error) -> Self {
        WidgetError::Transport(err.to_string())
    }
}

impl IntoResponse for WidgetError {
    fn into_response(self) -> Response {
        let status = match &self {
            WidgetError::Transport(_) => StatusCode::BAD_GATEWAY,
            WidgetError::Api(_) => StatusCode::BAD_GATEWAY,
            WidgetError::MountPointNotFound(_) => StatusCode::NOT_FOUND,
            WidgetError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            WidgetError::SlotNotOffered(_) => StatusCode::CONFLICT,
            WidgetError::SlotDisabled(_) => StatusCode::CONFLICT,
            WidgetError::NoSlotSelected => StatusCode::CONFLICT,
            WidgetError::Busy => StatusCode::CONFLICT,
            WidgetError::SessionNotFound => StatusCode::NOT_FOUND,
            WidgetError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = serde_json::json!({ "error": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_shown_verbatim() {
        let err = WidgetError::Api("slot taken".to_string());
        assert_eq!(err.user_message(), "slot taken");
    }

    #[test]
    fn test_transport_error_prefixed() {
        let err = WidgetError::Transport("connection refused".to_string());
        assert_eq!(err.user_message(), "Error: connection refused");
    }

    #[test]
    fn test_into_response_status() {
        let res = WidgetError::SessionNotFound.into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        let res = WidgetError::SlotNotOffered("09:00".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }
}
