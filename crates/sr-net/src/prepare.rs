//! Request preparation
//!
//! Turns [`AjaxSettings`] into the exact request that goes on the wire.
//! No I/O happens here, so the rules are testable without a server.

use serde_json::Value;
use url::Url;

use crate::query::to_query_string;
use crate::settings::{AjaxSettings, RequestData};
use crate::AjaxError;

/// Credentials policy of the request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Credentials {
    Omit,
    SameOrigin,
    Include,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRequest {
    /// Uppercase method
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
    pub credentials: Credentials,
    pub cross_domain: bool,
    /// 0 when disabled
    pub timeout_ms: u64,
}

impl PreparedRequest {
    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// Normalize settings into a request
///
/// `page_origin` is the document URL used to resolve relative URLs and to
/// detect cross-origin requests; `now_ms` feeds the cache buster.
pub fn prepare(
    settings: &AjaxSettings,
    page_origin: Option<&Url>,
    now_ms: u128,
) -> Result<PreparedRequest, AjaxError> {
    let raw_url = match settings.url.as_deref() {
        Some(url) if !url.trim().is_empty() => url.trim(),
        _ => return Err(AjaxError::MissingUrl),
    };

    let method = if settings.method.trim().is_empty() {
        "GET".to_string()
    } else {
        settings.method.trim().to_ascii_uppercase()
    };
    let get_or_head = method == "GET" || method == "HEAD";

    if settings.process_data && matches!(settings.data, Some(RequestData::Bytes(_))) {
        return Err(AjaxError::InvalidData(
            "process_data must be false for binary data".to_string(),
        ));
    }

    let mut url = raw_url.to_string();
    if get_or_head && !settings.cache {
        url = bust_cache(&url, now_ms);
    }

    let cross_domain = settings
        .cross_domain
        .unwrap_or_else(|| is_cross_origin(&url, page_origin));

    let mut headers = settings.headers.clone();
    let has = |headers: &[(String, String)], name: &str| find_header(headers, name).is_some();

    if !cross_domain && !has(&headers, "X-Requested-With") {
        headers.push(("X-Requested-With".to_string(), "XMLHttpRequest".to_string()));
    }

    if let Some(content_type) = &settings.content_type {
        let raw_text = !settings.process_data && matches!(settings.data, Some(RequestData::Raw(_)));
        if !get_or_head && !has(&headers, "Content-Type") && !raw_text {
            headers.push(("Content-Type".to_string(), content_type.clone()));
        }
    }

    let mut body = None;
    if let Some(data) = &settings.data {
        if get_or_head {
            if settings.process_data {
                let query = match data {
                    RequestData::Raw(text) => text.clone(),
                    RequestData::Fields(value) => to_query_string(value),
                    RequestData::Bytes(_) => String::new(),
                };
                if !query.is_empty() {
                    url = append_query(&url, &query);
                }
            }
        } else {
            body = Some(encode_body(data, settings.process_data, find_header(&headers, "Content-Type")));
        }
    }

    if !has(&headers, "Accept") {
        headers.push(("Accept".to_string(), settings.data_type.accept().to_string()));
    }

    if let Some(page) = page_origin {
        if let Ok(resolved) = page.join(&url) {
            url = resolved.to_string();
        }
    }

    let credentials = match settings.with_credentials {
        Some(true) => Credentials::Include,
        Some(false) => Credentials::Omit,
        None => Credentials::SameOrigin,
    };

    Ok(PreparedRequest {
        method,
        url,
        headers,
        body,
        credentials,
        cross_domain,
        timeout_ms: settings.timeout,
    })
}

fn encode_body(data: &RequestData, process_data: bool, content_type: Option<&str>) -> Vec<u8> {
    let fields = match data {
        RequestData::Bytes(bytes) => return bytes.clone(),
        RequestData::Raw(text) => return text.clone().into_bytes(),
        RequestData::Fields(value) => value,
    };
    if !process_data {
        return raw_text(fields).into_bytes();
    }
    let json = content_type
        .map(|ct| ct.to_ascii_lowercase().contains("application/json"))
        .unwrap_or(false);
    if json {
        fields.to_string().into_bytes()
    } else {
        to_query_string(fields).into_bytes()
    }
}

/// Unprocessed values go out as their JSON text, strings as-is
fn raw_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Split `url` into the part before `#` and the fragment (with `#`)
fn split_fragment(url: &str) -> (&str, &str) {
    match url.find('#') {
        Some(pos) => url.split_at(pos),
        None => (url, ""),
    }
}

fn append_query(url: &str, query: &str) -> String {
    let (base, fragment) = split_fragment(url);
    let separator = if base.contains('?') { '&' } else { '?' };
    format!("{base}{separator}{query}{fragment}")
}

/// Set `_=<now>`, replacing any existing `_` parameter
fn bust_cache(url: &str, now_ms: u128) -> String {
    let (base, fragment) = split_fragment(url);
    let (path, query) = match base.split_once('?') {
        Some((path, query)) => (path, query),
        None => (base, ""),
    };
    let stamp = format!("_={now_ms}");
    let mut params: Vec<&str> = query
        .split('&')
        .filter(|part| !part.is_empty() && *part != "_" && !part.starts_with("_="))
        .collect();
    params.push(&stamp);
    format!("{path}?{}{fragment}", params.join("&"))
}

fn is_cross_origin(url: &str, page_origin: Option<&Url>) -> bool {
    let Some(page) = page_origin else {
        return true;
    };
    match page.join(url) {
        Ok(target) => target.origin() != page.origin(),
        Err(_) => true,
    }
}
