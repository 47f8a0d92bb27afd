//! SR Net
//!
//! `ajax`: option-bag HTTP requests. Settings are normalized into a
//! [`PreparedRequest`] (query string, cache buster, headers, body), sent over
//! a [`Transport`] (a blocking reqwest client by default), and the response
//! is decoded according to the requested data type.

mod abort;
mod client;
mod prepare;
mod query;
mod settings;
mod transport;

pub use abort::{AbortReason, AbortSignal};
pub use client::{ajax, Ajax, AjaxResponse, ResponseBody};
pub use prepare::{prepare, Credentials, PreparedRequest};
pub use query::to_query_string;
pub use settings::{AjaxSettings, DataType, RequestData};
pub use transport::{ReqwestTransport, Transport, TransportError, TransportResponse};
pub use url::Url;

/// AJAX error
#[derive(Debug, thiserror::Error)]
pub enum AjaxError {
    #[error("AJAX URL is required")]
    MissingUrl,

    #[error("Invalid request data: {0}")]
    InvalidData(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP error {status}: {status_text}")]
    Http {
        status: u16,
        status_text: String,
        body: String,
    },

    #[error("Parser error: {message}")]
    Parse { message: String, body: String },

    #[error("Request timeout ({timeout_ms}ms)")]
    Timeout { timeout_ms: u64 },

    #[error("Request aborted")]
    Aborted,

    #[error("Network error: {0}")]
    Network(String),
}

impl AjaxError {
    /// Status reported for the error; 0 when no response was received
    pub fn status(&self) -> u16 {
        match self {
            AjaxError::Http { status, .. } => *status,
            _ => 0,
        }
    }
}
