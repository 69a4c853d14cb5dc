use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};

use serde_json::json;

use restsh_core::command::{Method, RequestSpec};
use restsh_core::dispatch::{Dispatch, Envelope};
use restsh_core::error::Error;
use restsh_core::replay::{Replay, Summary};
use restsh_core::session::Session;

#[derive(Debug)]
struct CapturedRequest {
    pub spec: RequestSpec,
    pub base_url: String,
}

/// A dispatch stub that records every request and answers from a queue of
/// canned results, standing in for the network.
struct MockDispatch {
    requests: RefCell<Vec<CapturedRequest>>,
    responses: RefCell<VecDeque<restsh_core::Result<Envelope>>>,
    resets: RefCell<usize>,
}

impl MockDispatch {
    fn new(responses: Vec<restsh_core::Result<Envelope>>) -> Self {
        Self {
            requests: RefCell::new(Vec::new()),
            responses: RefCell::new(responses.into_iter().collect()),
            resets: RefCell::new(0),
        }
    }
}

impl Dispatch for MockDispatch {
    fn send(&self, spec: &RequestSpec, session: &Session) -> restsh_core::Result<Envelope> {
        self.requests.borrow_mut().push(CapturedRequest {
            spec: spec.clone(),
            base_url: session.base_url.clone(),
        });
        self.responses
            .borrow_mut()
            .pop_front()
            .expect("mock ran out of canned responses")
    }

    fn reset(&mut self) -> restsh_core::Result<()> {
        *self.resets.borrow_mut() += 1;
        Ok(())
    }
}

fn envelope(status: u16, body: serde_json::Value) -> restsh_core::Result<Envelope> {
    Ok(Envelope {
        status,
        headers: BTreeMap::new(),
        body: body.to_string().into_bytes(),
    })
}

#[test]
fn test_passing_replay_run() {
    let script = "// health check\n\nGET /health\n200 '{\"status\":\"ok\"}'\n";
    let client = MockDispatch::new(vec![envelope(200, json!({"status": "ok"}))]);
    let mut session = Session::new("http://localhost:8080");

    let summary = Replay::new(false)
        .run(&mut session, &client, script.as_bytes())
        .expect("replay should pass");
    assert_eq!(summary, Summary { passed: 1, failed: 0 });

    let requests = client.requests.borrow();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].spec.method, Method::Get);
    assert_eq!(requests[0].spec.path, "/health");
    assert_eq!(requests[0].base_url, "http://localhost:8080");
}

#[test]
fn test_set_url_directive_needs_no_expectation() {
    let script = "set url http://localhost:9999\nGET /health\n200 '{}'\n";
    let client = MockDispatch::new(vec![envelope(200, json!({}))]);
    let mut session = Session::new("http://localhost:8080");

    Replay::new(false)
        .run(&mut session, &client, script.as_bytes())
        .expect("replay should pass");
    assert_eq!(session.base_url, "http://localhost:9999");
    assert_eq!(client.requests.borrow()[0].base_url, "http://localhost:9999");
}

#[test]
fn test_status_mismatch_aborts_the_run() {
    let script = "GET /health\n200 '{\"status\":\"ok\"}'\nGET /never-reached\n200 '{}'\n";
    let client = MockDispatch::new(vec![envelope(500, json!({"error": "boom"}))]);
    let mut session = Session::new("http://localhost:8080");

    let err = Replay::new(false)
        .run(&mut session, &client, script.as_bytes())
        .unwrap_err();
    match err {
        Error::StatusMismatch {
            expected,
            actual,
            body,
        } => {
            assert_eq!(expected, "200");
            assert_eq!(actual, 500);
            // The mismatch carries the body the server actually sent.
            let payload: serde_json::Value =
                serde_json::from_str(&body).expect("mismatch body should be the response JSON");
            assert_eq!(payload, json!({"error": "boom"}));
        }
        other => panic!("expected status mismatch, got {:?}", other),
    }
    // The second directive was never dispatched.
    assert_eq!(client.requests.borrow().len(), 1);
}

#[test]
fn test_continue_on_error_runs_the_whole_script() {
    let script = "GET /a\n200 '{}'\nGET /b\n200 '{}'\n";
    let client = MockDispatch::new(vec![envelope(500, json!({})), envelope(200, json!({}))]);
    let mut session = Session::new("http://localhost:8080");

    let summary = Replay::new(true)
        .run(&mut session, &client, script.as_bytes())
        .expect("continue-on-error should finish the run");
    assert_eq!(summary, Summary { passed: 1, failed: 1 });
    assert_eq!(client.requests.borrow().len(), 2);
}

#[test]
fn test_body_comparison_is_type_sensitive() {
    let script = "GET /a\n200 '{\"a\":1}'\n";
    let client = MockDispatch::new(vec![envelope(200, json!({"a": "1"}))]);
    let mut session = Session::new("http://localhost:8080");

    let err = Replay::new(false)
        .run(&mut session, &client, script.as_bytes())
        .unwrap_err();
    assert!(matches!(err, Error::BodyMismatch { .. }));
}

#[test]
fn test_body_comparison_ignores_key_order() {
    let script = "GET /a\n200 '{\"a\":1,\"b\":2}'\n";
    let client = MockDispatch::new(vec![envelope(200, json!({"b": 2, "a": 1}))]);
    let mut session = Session::new("http://localhost:8080");

    let summary = Replay::new(false)
        .run(&mut session, &client, script.as_bytes())
        .expect("structurally equal bodies should pass");
    assert_eq!(summary.passed, 1);
}

#[test]
fn test_dangling_directive_is_always_fatal() {
    let script = "GET /health\n";
    let mut session = Session::new("http://localhost:8080");

    // Fatal even with continue-on-error.
    let client = MockDispatch::new(vec![]);
    let err = Replay::new(true)
        .run(&mut session, &client, script.as_bytes())
        .unwrap_err();
    assert!(matches!(err, Error::ScriptFormat(_)));
    assert!(client.requests.borrow().is_empty());
}

#[test]
fn test_malformed_expectation_is_always_fatal() {
    let script = "GET /health\n200 ok extra-token\n";
    let client = MockDispatch::new(vec![]);
    let mut session = Session::new("http://localhost:8080");

    let err = Replay::new(true)
        .run(&mut session, &client, script.as_bytes())
        .unwrap_err();
    assert!(matches!(err, Error::ScriptFormat(_)));
}

#[test]
fn test_dispatch_error_reported_with_directive() {
    let script = "GET /down\n200 '{}'\n";
    let client = MockDispatch::new(vec![Err(Error::Network("connection refused".into()))]);
    let mut session = Session::new("http://localhost:8080");

    let err = Replay::new(false)
        .run(&mut session, &client, script.as_bytes())
        .unwrap_err();
    assert!(matches!(err, Error::Network(_)));
}

#[test]
fn test_quoted_body_directive_reaches_dispatch_intact() {
    let script = "POST /users '{\"name\": \"Ada Lovelace\"}'\n201 '{\"id\":1}'\n";
    let client = MockDispatch::new(vec![envelope(201, json!({"id": 1}))]);
    let mut session = Session::new("http://localhost:8080");

    Replay::new(false)
        .run(&mut session, &client, script.as_bytes())
        .expect("replay should pass");

    let requests = client.requests.borrow();
    assert_eq!(requests[0].spec.method, Method::Post);
    assert_eq!(
        requests[0].spec.body.as_deref(),
        Some("{\"name\": \"Ada Lovelace\"}")
    );
}

#[test]
fn test_del_alias_maps_to_delete() {
    let script = "DEL /users/1\n204 '{}'\n";
    let client = MockDispatch::new(vec![envelope(204, json!({}))]);
    let mut session = Session::new("http://localhost:8080");

    Replay::new(false)
        .run(&mut session, &client, script.as_bytes())
        .expect("replay should pass");
    assert_eq!(client.requests.borrow()[0].spec.method, Method::Delete);
}

#[test]
fn test_reset_leaves_base_url_alone() {
    let mut client = MockDispatch::new(vec![]);
    let session = Session::new("http://localhost:8080");

    client.reset().unwrap();
    assert_eq!(*client.resets.borrow(), 1);
    assert_eq!(session.base_url, "http://localhost:8080");
    assert_eq!(session.content_type, "application/json");
}
