//! Integration tests for the AJAX client
//!
//! A scripted transport records prepared requests and replays canned
//! responses, so status handling, decoding, timeouts and aborts are checked
//! without a server.

use std::cell::RefCell;

use serde_json::json;
use sr_net::{
    AbortSignal, Ajax, AjaxError, AjaxSettings, PreparedRequest, ResponseBody, Transport,
    TransportError, TransportResponse,
};

type Reply = Box<dyn Fn(&PreparedRequest) -> Result<TransportResponse, TransportError>>;

struct ScriptedTransport {
    sent: RefCell<Vec<PreparedRequest>>,
    reply: Reply,
}

impl ScriptedTransport {
    fn new(reply: impl Fn(&PreparedRequest) -> Result<TransportResponse, TransportError> + 'static) -> Self {
        Self {
            sent: RefCell::new(Vec::new()),
            reply: Box::new(reply),
        }
    }

    fn last(&self) -> PreparedRequest {
        self.sent.borrow().last().cloned().unwrap()
    }
}

impl Transport for ScriptedTransport {
    fn send(&self, request: &PreparedRequest) -> Result<TransportResponse, TransportError> {
        self.sent.borrow_mut().push(request.clone());
        (self.reply)(request)
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn reply(status: u16, body: &str) -> Result<TransportResponse, TransportError> {
    Ok(TransportResponse {
        status,
        status_text: match status {
            200 => "OK",
            404 => "Not Found",
            _ => "",
        }
        .to_string(),
        headers: vec![("Content-Type".to_string(), "application/json".to_string())],
        body: body.to_string(),
    })
}

fn client(
    respond: impl Fn(&PreparedRequest) -> Result<TransportResponse, TransportError> + 'static,
) -> Ajax<ScriptedTransport> {
    init_tracing();
    Ajax::with_transport(ScriptedTransport::new(respond))
        .page_origin("https://shop.example.com/cart/")
        .unwrap()
}

// ============================================================================
// SUCCESS
// ============================================================================

#[test]
fn test_text_response() {
    let ajax = client(|_| reply(200, "hello"));
    let response = ajax.send(&AjaxSettings::new("/greeting")).unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.status_text, "OK");
    assert_eq!(response.body, ResponseBody::Text("hello".to_string()));
    assert_eq!(response.header("content-type"), Some("application/json"));

    let sent = ajax.transport().last();
    assert_eq!(sent.url, "https://shop.example.com/greeting");
    assert_eq!(sent.header("X-Requested-With"), Some("XMLHttpRequest"));
}

#[test]
fn test_json_response() {
    let ajax = client(|_| reply(200, r#"{"items": [1, 2]}"#));
    let response = ajax
        .send(&AjaxSettings::new("items").data_type("json").data(json!({"page": 3})))
        .unwrap();
    assert_eq!(response.body.as_json(), Some(&json!({"items": [1, 2]})));
    assert_eq!(ajax.transport().last().url, "https://shop.example.com/cart/items?page=3");
}

#[test]
fn test_empty_json_body_is_null() {
    let ajax = client(|_| reply(200, "  "));
    let response = ajax.send(&AjaxSettings::new("/a").data_type("json")).unwrap();
    assert_eq!(response.body, ResponseBody::Json(serde_json::Value::Null));
}

#[test]
fn test_post_body_reaches_transport() {
    let ajax = client(|req| {
        let body = String::from_utf8(req.body.clone().unwrap_or_default()).unwrap();
        reply(200, &body)
    });
    let settings = AjaxSettings::new("/checkout")
        .method("post")
        .data(json!({"qty": 2, "sku": "A 1"}));
    let response = ajax.send(&settings).unwrap();
    assert_eq!(response.body.as_text(), Some("qty=2&sku=A+1"));
    assert_eq!(ajax.transport().last().method, "POST");
}

// ============================================================================
// FAILURES
// ============================================================================

#[test]
fn test_http_error_keeps_body() {
    let ajax = client(|_| reply(404, "missing"));
    let err = ajax.send(&AjaxSettings::new("/gone")).unwrap_err();
    assert_eq!(err.status(), 404);
    match err {
        AjaxError::Http { status_text, body, .. } => {
            assert_eq!(status_text, "Not Found");
            assert_eq!(body, "missing");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_parse_error() {
    let ajax = client(|_| reply(200, "{not json"));
    let err = ajax.send(&AjaxSettings::new("/a").data_type("json")).unwrap_err();
    assert!(matches!(err, AjaxError::Parse { ref body, .. } if body == "{not json"));
    assert_eq!(err.status(), 0);
}

#[test]
fn test_missing_url_never_reaches_transport() {
    let ajax = client(|_| reply(200, ""));
    assert!(matches!(ajax.send(&AjaxSettings::default()), Err(AjaxError::MissingUrl)));
    assert!(ajax.transport().sent.borrow().is_empty());
}

#[test]
fn test_network_error() {
    let ajax = client(|_| Err(TransportError::Network("connection refused".to_string())));
    let err = ajax.send(&AjaxSettings::new("/a")).unwrap_err();
    assert!(matches!(err, AjaxError::Network(ref msg) if msg == "connection refused"));
}

#[test]
fn test_invalid_page_origin() {
    let result = Ajax::with_transport(ScriptedTransport::new(|_| reply(200, ""))).page_origin("not a url");
    assert!(matches!(result, Err(AjaxError::InvalidUrl(_))));
}

// ============================================================================
// TIMEOUT AND ABORT
// ============================================================================

#[test]
fn test_timeout() {
    let ajax = client(|req| {
        assert_eq!(req.timeout_ms, 250);
        Err(TransportError::TimedOut)
    });
    let signal = AbortSignal::new();
    let err = ajax
        .send_with_signal(&AjaxSettings::new("/slow").timeout(250), &signal)
        .unwrap_err();
    assert!(matches!(err, AjaxError::Timeout { timeout_ms: 250 }));
    assert!(signal.is_aborted());
}

#[test]
fn test_abort_before_send() {
    let ajax = client(|_| reply(200, "late"));
    let signal = AbortSignal::new();
    signal.abort();
    let err = ajax.send_with_signal(&AjaxSettings::new("/a"), &signal).unwrap_err();
    assert!(matches!(err, AjaxError::Aborted));
    assert!(ajax.transport().sent.borrow().is_empty());
}

#[test]
fn test_abort_during_send_discards_response() {
    let signal = AbortSignal::new();
    let handle = signal.clone();
    let ajax = client(move |_| {
        handle.abort();
        reply(200, "ignored")
    });
    let err = ajax.send_with_signal(&AjaxSettings::new("/a"), &signal).unwrap_err();
    assert!(matches!(err, AjaxError::Aborted));
    assert_eq!(ajax.transport().sent.borrow().len(), 1);
}
