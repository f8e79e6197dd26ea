//! cursor-session library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the `sharedcursor` binary share the same module tree.

pub mod application;
pub mod infrastructure;

pub use application::share_cursor::{CursorSession, SessionConfig, SessionError, SessionEvent};
