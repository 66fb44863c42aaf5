/// Error type shared by the popup, the settings store and the courier client
use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CourierError {
    #[error("Browser call failed: {0}")]
    Bridge(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid settings: {message}")]
    InvalidSettings { message: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Not signed in or session expired")]
    Unauthorized,

    #[error("No active tab in the current window")]
    NoActiveTab,

    #[error("The active tab has no URL (missing tab permission?)")]
    TabHasNoUrl,

    #[error("Only http and https pages can be sent, got {0}")]
    UnsupportedUrl(String),
}

impl CourierError {
    pub fn invalid_settings(message: impl Into<String>) -> Self {
        CourierError::InvalidSettings {
            message: message.into(),
        }
    }
}

// Rejected promises carry arbitrary JS values; keep their debug rendering
impl From<JsValue> for CourierError {
    fn from(value: JsValue) -> Self {
        CourierError::Bridge(format!("{:?}", value))
    }
}

impl From<serde_json::Error> for CourierError {
    fn from(err: serde_json::Error) -> Self {
        CourierError::Serialization(err.to_string())
    }
}

impl From<serde_wasm_bindgen::Error> for CourierError {
    fn from(err: serde_wasm_bindgen::Error) -> Self {
        CourierError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CourierError>;
