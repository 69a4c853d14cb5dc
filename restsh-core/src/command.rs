//! Interactive command model: HTTP methods and the shell command table.

use crate::error::{Error, Result};

/// HTTP methods the shell can issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Head,
    Patch,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Head => "HEAD",
            Method::Patch => "PATCH",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Method {
    type Err = ();

    /// Verbs are case-sensitive and fully upper-case; `DEL` is accepted
    /// as an alias for `DELETE`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "DELETE" | "DEL" => Ok(Method::Delete),
            "HEAD" => Ok(Method::Head),
            "PATCH" => Ok(Method::Patch),
            _ => Err(()),
        }
    }
}

/// One HTTP request to issue: built per invocation, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSpec {
    pub method: Method,
    pub path: String,
    pub body: Option<String>,
}

impl RequestSpec {
    pub fn new(method: Method, path: impl Into<String>, body: Option<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body,
        }
    }
}

/// An interactive command parsed from a tokenized input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `set url <value>` — replace the session base URL.
    SetUrl(String),
    /// `get url` — report the current base URL.
    GetUrl,
    /// `reset` — discard the session's cookie store.
    Reset,
    /// `clear` — clear the display, session untouched.
    Clear,
    /// `help` — print the command table.
    Help,
    /// An HTTP verb with a path and optional body.
    Request(RequestSpec),
    /// `exit`, `quit` or `q` — leave the shell.
    Exit,
}

/// Map tokens to a [`Command`], enforcing arity.
///
/// Anything that is not in the command table, or has the wrong number of
/// arguments, is an [`Error::InvalidCommand`].
pub fn parse(tokens: &[String]) -> Result<Command> {
    let invalid = || Error::InvalidCommand(tokens.to_vec());
    let first = tokens.first().ok_or_else(invalid)?;

    match first.as_str() {
        "set" => {
            if tokens.len() != 3 || tokens[1] != "url" {
                return Err(invalid());
            }
            Ok(Command::SetUrl(tokens[2].clone()))
        }
        "get" => {
            if tokens.len() != 2 || tokens[1] != "url" {
                return Err(invalid());
            }
            Ok(Command::GetUrl)
        }
        "reset" if tokens.len() == 1 => Ok(Command::Reset),
        "clear" if tokens.len() == 1 => Ok(Command::Clear),
        "help" if tokens.len() == 1 => Ok(Command::Help),
        "exit" | "quit" | "q" if tokens.len() == 1 => Ok(Command::Exit),
        verb => {
            let method: Method = verb.parse().map_err(|_| invalid())?;
            if tokens.len() < 2 || tokens.len() > 3 {
                return Err(invalid());
            }
            Ok(Command::Request(RequestSpec::new(
                method,
                tokens[1].clone(),
                tokens.get(2).cloned(),
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_set_url() {
        let cmd = parse(&toks(&["set", "url", "http://localhost:8080"])).unwrap();
        assert_eq!(cmd, Command::SetUrl("http://localhost:8080".to_string()));
    }

    #[test]
    fn test_parse_set_requires_url_and_value() {
        assert!(parse(&toks(&["set", "url"])).is_err());
        assert!(parse(&toks(&["set", "host", "x"])).is_err());
    }

    #[test]
    fn test_parse_get_url() {
        assert_eq!(parse(&toks(&["get", "url"])).unwrap(), Command::GetUrl);
        assert!(parse(&toks(&["get", "cookies"])).is_err());
    }

    #[test]
    fn test_parse_request_with_body() {
        let cmd = parse(&toks(&["POST", "/users", r#"{"name":"x"}"#])).unwrap();
        match cmd {
            Command::Request(spec) => {
                assert_eq!(spec.method, Method::Post);
                assert_eq!(spec.path, "/users");
                assert_eq!(spec.body.as_deref(), Some(r#"{"name":"x"}"#));
            }
            other => panic!("expected request, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_del_alias() {
        let cmd = parse(&toks(&["DEL", "/users/1"])).unwrap();
        match cmd {
            Command::Request(spec) => assert_eq!(spec.method, Method::Delete),
            other => panic!("expected request, got {:?}", other),
        }
    }

    #[test]
    fn test_verbs_are_case_sensitive() {
        assert!(parse(&toks(&["Get", "/users"])).is_err());
        assert!(parse(&toks(&["post", "/users"])).is_err());
    }

    #[test]
    fn test_request_arity() {
        assert!(parse(&toks(&["GET"])).is_err());
        assert!(parse(&toks(&["GET", "/a", "b", "c"])).is_err());
    }

    #[test]
    fn test_exit_aliases() {
        for alias in ["exit", "quit", "q"] {
            assert_eq!(parse(&toks(&[alias])).unwrap(), Command::Exit);
        }
    }

    #[test]
    fn test_empty_and_unknown_are_invalid() {
        assert!(parse(&[]).is_err());
        assert!(parse(&toks(&["frobnicate"])).is_err());
    }
}
