//! Replay/assertion engine for scripted runs.
//!
//! A script alternates directive lines (`GET /health`, `set url ...`) with
//! expectation lines (`200 '{"status":"ok"}'`). The engine is an explicit
//! two-state machine; a directive without its expectation is a format
//! violation and aborts the run no matter what.

use std::io::BufRead;

use colored::Colorize;
use serde_json::{Map, Value};

use crate::command::{Method, RequestSpec};
use crate::dispatch::{Dispatch, Envelope};
use crate::error::{Error, Result};
use crate::session::Session;
use crate::token;

/// Outcome counts for a completed replay run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub passed: usize,
    pub failed: usize,
}

enum State {
    AwaitingDirective,
    AwaitingExpectation(RequestSpec),
}

/// Drives a script against a [`Dispatch`] implementation and verifies
/// observed responses against expectations.
pub struct Replay {
    continue_on_error: bool,
}

impl Replay {
    pub fn new(continue_on_error: bool) -> Self {
        Self { continue_on_error }
    }

    /// Run a script to completion.
    ///
    /// Without continue-on-error, the first failed check is returned as
    /// the run's error. With it, failures are logged and counted, and the
    /// run proceeds to the next directive pair. Script format violations
    /// are fatal either way.
    pub fn run<D: Dispatch>(
        &self,
        session: &mut Session,
        client: &D,
        input: impl BufRead,
    ) -> Result<Summary> {
        let mut state = State::AwaitingDirective;
        let mut summary = Summary::default();

        for (idx, line) in input.lines().enumerate() {
            let line = line?;
            let lineno = idx + 1;
            let tokens = match token::tokenize(&line) {
                Ok(tokens) => tokens,
                Err(e) => {
                    eprintln!("{} line {}: {}", "✖".red().bold(), lineno, e);
                    continue;
                }
            };
            if tokens.is_empty() {
                continue;
            }

            state = match state {
                State::AwaitingDirective => {
                    if tokens[0].starts_with("//") {
                        State::AwaitingDirective
                    } else if tokens[0] == "set" {
                        if tokens.len() != 3 || tokens[1] != "url" {
                            return Err(Error::ScriptFormat(format!(
                                "line {}: expected `set url <value>`, got: {:?}",
                                lineno, tokens
                            )));
                        }
                        session.base_url = tokens[2].clone();
                        State::AwaitingDirective
                    } else {
                        State::AwaitingExpectation(parse_directive(&tokens, lineno)?)
                    }
                }
                State::AwaitingExpectation(spec) => {
                    if tokens.len() != 2 {
                        return Err(Error::ScriptFormat(format!(
                            "line {}: expected `status-code json-response`, got: {:?}",
                            lineno, tokens
                        )));
                    }
                    match self.check(session, client, &spec, &tokens[0], &tokens[1]) {
                        Ok(envelope) => {
                            summary.passed += 1;
                            eprintln!(
                                "{} {} {}: {} {}",
                                ">".green(),
                                spec.method,
                                spec.path,
                                envelope.status,
                                envelope.body_text()
                            );
                        }
                        Err(e) => {
                            summary.failed += 1;
                            eprintln!(
                                "{} {} {}: {}",
                                "✖".red().bold(),
                                spec.method,
                                spec.path,
                                e
                            );
                            if !self.continue_on_error {
                                return Err(e);
                            }
                        }
                    }
                    State::AwaitingDirective
                }
            };
        }

        if let State::AwaitingExpectation(spec) = state {
            return Err(Error::ScriptFormat(format!(
                "missing expectation for {} {}",
                spec.method, spec.path
            )));
        }
        Ok(summary)
    }

    /// The three checks, each short-circuiting: dispatch must succeed,
    /// the decimal status must match exactly, the bodies must be
    /// structurally equal JSON objects.
    fn check<D: Dispatch>(
        &self,
        session: &Session,
        client: &D,
        spec: &RequestSpec,
        want_status: &str,
        want_body: &str,
    ) -> Result<Envelope> {
        let envelope = client.send(spec, session)?;
        if want_status != envelope.status.to_string() {
            return Err(Error::StatusMismatch {
                expected: want_status.to_string(),
                actual: envelope.status,
                body: envelope.body_text(),
            });
        }
        compare_json(want_body, &envelope.body)?;
        Ok(envelope)
    }
}

fn parse_directive(tokens: &[String], lineno: usize) -> Result<RequestSpec> {
    let method: Method = tokens[0].parse().map_err(|_| {
        Error::ScriptFormat(format!("line {}: unknown verb: {}", lineno, tokens[0]))
    })?;
    if tokens.len() < 2 || tokens.len() > 3 {
        return Err(Error::ScriptFormat(format!(
            "line {}: expected `VERB path [body]`, got: {:?}",
            lineno, tokens
        )));
    }
    Ok(RequestSpec::new(
        method,
        tokens[1].clone(),
        tokens.get(2).cloned(),
    ))
}

/// Structural comparison of two JSON objects: decode both sides into
/// key/value maps and compare deeply, so key order and whitespace are
/// irrelevant while number/string/boolean typing still matters. Numbers
/// compare by value, so `1` and `1.0` are equal.
pub fn compare_json(expected: &str, actual: &[u8]) -> Result<()> {
    let want: Map<String, Value> = serde_json::from_str(expected)
        .map_err(|e| Error::JsonDecode(format!("{}: {}", expected, e)))?;
    let actual_text = String::from_utf8_lossy(actual);
    let got: Map<String, Value> = serde_json::from_str(&actual_text)
        .map_err(|e| Error::JsonDecode(format!("{}: {}", actual_text, e)))?;
    if !json_eq(&Value::Object(want), &Value::Object(got)) {
        return Err(Error::BodyMismatch {
            expected: expected.to_string(),
            actual: actual_text.into_owned(),
        });
    }
    Ok(())
}

/// Deep equality over decoded JSON. `serde_json` keeps integer and float
/// representations distinct, so numbers compare through `as_f64`.
fn json_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter()
                    .all(|(key, v)| y.get(key).is_some_and(|w| json_eq(v, w)))
        }
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(v, w)| json_eq(v, w))
        }
        _ => a == b,
    }
}
