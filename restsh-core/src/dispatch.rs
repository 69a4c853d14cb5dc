//! The HTTP dispatch seam: URL resolution, the result envelope and the
//! client trait the interactive loop and replay engine drive.

use std::collections::BTreeMap;

use url::Url;

use crate::command::RequestSpec;
use crate::error::{Error, Result};
use crate::session::Session;

/// Uniform result of a completed HTTP request: status, header map and the
/// full response body. Failures never produce a partial envelope; they
/// surface as `Err` from [`Dispatch::send`].
#[derive(Debug, Clone)]
pub struct Envelope {
    pub status: u16,
    pub headers: BTreeMap<String, Vec<String>>,
    pub body: Vec<u8>,
}

impl Envelope {
    /// The response body as lossy UTF-8 with surrounding whitespace trimmed.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).trim().to_string()
    }
}

/// A generic interface for executing one request at a time against the
/// current session. Implementations own the persistent cookie store;
/// cookies received are stored and resent on later calls until `reset`.
/// Tests drive the replay engine with a mock implementation.
pub trait Dispatch {
    /// Resolve the spec's path against the session base URL, send the
    /// request synchronously and read the full body.
    fn send(&self, spec: &RequestSpec, session: &Session) -> Result<Envelope>;

    /// Replace the cookie store with an empty one. Base URL and content
    /// type are untouched.
    fn reset(&mut self) -> Result<()>;
}

/// Resolve `path` against `base`.
///
/// A path with an explicit `http:`/`https:` scheme parses standalone.
/// Otherwise base and path are joined with a slash and every run of two
/// or more slashes in the resulting URL path collapses to one, so the
/// normalization is idempotent regardless of stray slashes on either input.
pub fn resolve(base: &str, path: &str) -> Result<Url> {
    if path.starts_with("http:") || path.starts_with("https:") {
        return Url::parse(path).map_err(|e| Error::UrlResolution(format!("{}: {}", path, e)));
    }

    let joined = format!("{}/{}", base, path);
    let mut url =
        Url::parse(&joined).map_err(|e| Error::UrlResolution(format!("{}: {}", joined, e)))?;
    let collapsed = collapse_slashes(url.path());
    url.set_path(&collapsed);
    Ok(url)
}

fn collapse_slashes(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for c in path.chars() {
        if c == '/' && out.ends_with('/') {
            continue;
        }
        out.push(c);
    }
    out
}
