//! Core engine for `restsh`, an interactive REST shell with scripted
//! replay: quote-aware tokenizing, command parsing, base-URL resolution,
//! the HTTP dispatch seam and the replay/assertion state machine.

pub mod command;
pub mod dispatch;
pub mod error;
pub mod replay;
pub mod session;
pub mod token;

pub use error::{Error, Result};
