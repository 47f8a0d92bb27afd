//! AJAX client
//!
//! Prepares the request, runs it through the transport, and decodes the
//! response. Errors come back as [`AjaxError`] variants: HTTP status,
//! parse failure, timeout, abort or network failure.

use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::Value;
use url::Url;

use crate::abort::{AbortReason, AbortSignal};
use crate::prepare::prepare;
use crate::settings::{AjaxSettings, DataType};
use crate::transport::{ReqwestTransport, Transport, TransportError};
use crate::AjaxError;

/// Decoded response body
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Text(String),
    Json(Value),
}

impl ResponseBody {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ResponseBody::Text(text) => Some(text),
            ResponseBody::Json(_) => None,
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ResponseBody::Json(value) => Some(value),
            ResponseBody::Text(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AjaxResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    pub body: ResponseBody,
}

impl AjaxResponse {
    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

pub struct Ajax<T: Transport = ReqwestTransport> {
    transport: T,
    page_origin: Option<Url>,
}

impl Ajax<ReqwestTransport> {
    pub fn new() -> Result<Self, AjaxError> {
        let transport = ReqwestTransport::new().map_err(|e| AjaxError::Network(e.to_string()))?;
        Ok(Self::with_transport(transport))
    }
}

impl<T: Transport> Ajax<T> {
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport,
            page_origin: None,
        }
    }

    /// Document URL used to resolve relative URLs and detect cross-origin requests
    pub fn page_origin(mut self, page: &str) -> Result<Self, AjaxError> {
        let url = Url::parse(page).map_err(|e| AjaxError::InvalidUrl(format!("{page}: {e}")))?;
        self.page_origin = Some(url);
        Ok(self)
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn send(&self, settings: &AjaxSettings) -> Result<AjaxResponse, AjaxError> {
        self.send_with_signal(settings, &AbortSignal::new())
    }

    /// Send the request; `signal` may be aborted from another thread
    pub fn send_with_signal(
        &self,
        settings: &AjaxSettings,
        signal: &AbortSignal,
    ) -> Result<AjaxResponse, AjaxError> {
        let now_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        let request = prepare(settings, self.page_origin.as_ref(), now_ms)?;
        signal.check()?;

        tracing::debug!("AJAX {} {}", request.method, request.url);
        let result = self.transport.send(&request);

        if let Err(TransportError::TimedOut) = result {
            signal.abort_with(AbortReason::Timeout {
                timeout_ms: request.timeout_ms,
            });
        }
        // An abort during the exchange discards whatever came back
        signal.check()?;

        let response = result.map_err(|e| {
            tracing::warn!("AJAX {} {} failed: {}", request.method, request.url, e);
            AjaxError::Network(e.to_string())
        })?;

        if !(200..300).contains(&response.status) {
            return Err(AjaxError::Http {
                status: response.status,
                status_text: response.status_text,
                body: response.body,
            });
        }

        let body = match settings.data_type {
            DataType::Json => ResponseBody::Json(parse_json(response.body)?),
            _ => ResponseBody::Text(response.body),
        };

        Ok(AjaxResponse {
            status: response.status,
            status_text: response.status_text,
            headers: response.headers,
            body,
        })
    }
}

/// An empty body decodes to `null`
fn parse_json(body: String) -> Result<Value, AjaxError> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&body).map_err(|e| AjaxError::Parse {
        message: e.to_string(),
        body,
    })
}

/// One-shot request over a default client
pub fn ajax(settings: &AjaxSettings) -> Result<AjaxResponse, AjaxError> {
    Ajax::new()?.send(settings)
}
