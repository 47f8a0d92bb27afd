//! Request settings
//!
//! Builder-style option bag. Also deserializable from JSON with camelCase
//! keys (`dataType`, `processData`, ...); unknown keys are ignored.

use serde::Deserialize;
use serde_json::Value;

/// Expected response type
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "String")]
pub enum DataType {
    #[default]
    Text,
    Json,
    Html,
    Script,
    /// Anything else; accepts `*/*`
    Other(String),
}

impl From<String> for DataType {
    fn from(name: String) -> Self {
        DataType::parse(&name)
    }
}

impl DataType {
    pub fn parse(name: &str) -> DataType {
        match name.to_ascii_lowercase().as_str() {
            "text" | "" => DataType::Text,
            "json" => DataType::Json,
            "html" => DataType::Html,
            "script" => DataType::Script,
            other => DataType::Other(other.to_string()),
        }
    }

    /// Default `Accept` header
    pub fn accept(&self) -> &'static str {
        match self {
            DataType::Json => "application/json, text/javascript, */*; q=0.01",
            DataType::Html => "text/html, */*; q=0.01",
            DataType::Script => "text/javascript, application/javascript, */*; q=0.01",
            DataType::Text => "text/plain, */*; q=0.01",
            DataType::Other(_) => "*/*",
        }
    }
}

/// Request payload
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RequestData {
    /// Sent as given
    Raw(String),
    /// Serialized as a query string or JSON
    Fields(Value),
    /// Binary body; requires `process_data = false`
    #[serde(skip)]
    Bytes(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AjaxSettings {
    pub url: Option<String>,
    /// Case-insensitive; `GET` when empty
    pub method: String,
    #[serde(deserialize_with = "headers_from_map")]
    pub headers: Vec<(String, String)>,
    pub data: Option<RequestData>,
    pub data_type: DataType,
    /// `None` sends no default `Content-Type`
    pub content_type: Option<String>,
    pub process_data: bool,
    pub cache: bool,
    /// Milliseconds; 0 disables the timeout
    pub timeout: u64,
    /// `None` detects cross-origin requests from the page origin
    pub cross_domain: Option<bool>,
    /// `None` keeps the same-origin credentials policy
    pub with_credentials: Option<bool>,
}

pub(crate) const DEFAULT_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=UTF-8";

impl Default for AjaxSettings {
    fn default() -> Self {
        Self {
            url: None,
            method: "GET".to_string(),
            headers: Vec::new(),
            data: None,
            data_type: DataType::Text,
            content_type: Some(DEFAULT_CONTENT_TYPE.to_string()),
            process_data: true,
            cache: true,
            timeout: 0,
            cross_domain: None,
            with_credentials: None,
        }
    }
}

fn headers_from_map<'de, D>(deserializer: D) -> Result<Vec<(String, String)>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let map = serde_json::Map::<String, Value>::deserialize(deserializer)?;
    Ok(map
        .into_iter()
        .map(|(name, value)| match value {
            Value::String(s) => (name, s),
            other => (name, other.to_string()),
        })
        .collect())
}

impl AjaxSettings {
    pub fn new(url: &str) -> Self {
        Self {
            url: Some(url.to_string()),
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn method(mut self, method: &str) -> Self {
        self.method = method.to_string();
        self
    }

    /// Add a header, replacing any value with the same name
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn data(mut self, data: Value) -> Self {
        self.data = Some(RequestData::Fields(data));
        self
    }

    pub fn raw_data(mut self, data: &str) -> Self {
        self.data = Some(RequestData::Raw(data.to_string()));
        self
    }

    pub fn bytes(mut self, data: Vec<u8>) -> Self {
        self.data = Some(RequestData::Bytes(data));
        self
    }

    pub fn data_type(mut self, name: &str) -> Self {
        self.data_type = DataType::parse(name);
        self
    }

    pub fn content_type(mut self, value: &str) -> Self {
        self.content_type = Some(value.to_string());
        self
    }

    /// Send no default `Content-Type`
    pub fn no_content_type(mut self) -> Self {
        self.content_type = None;
        self
    }

    pub fn process_data(mut self, enabled: bool) -> Self {
        self.process_data = enabled;
        self
    }

    pub fn cache(mut self, enabled: bool) -> Self {
        self.cache = enabled;
        self
    }

    pub fn timeout(mut self, ms: u64) -> Self {
        self.timeout = ms;
        self
    }

    pub fn cross_domain(mut self, cross: bool) -> Self {
        self.cross_domain = Some(cross);
        self
    }

    pub fn with_credentials(mut self, include: bool) -> Self {
        self.with_credentials = Some(include);
        self
    }
}
