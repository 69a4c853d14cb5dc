//! Per-run session state.

/// Mutable state shared by the interactive loop and the replay engine:
/// the base URL that relative paths resolve against and the content type
/// applied to request bodies. One `Session` lives for the whole process.
///
/// The cookie store that completes the session belongs to the
/// [`Dispatch`](crate::dispatch::Dispatch) implementation, since it is
/// tied to the HTTP client; [`Dispatch::reset`](crate::dispatch::Dispatch::reset)
/// replaces it with an empty one without touching this struct.
#[derive(Debug, Clone)]
pub struct Session {
    pub base_url: String,
    pub content_type: String,
}

impl Session {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            content_type: "application/json".to_string(),
        }
    }
}
