//! Application layer use cases for the shared cursor session.
//!
//! # What is the "application" layer? (for beginners)
//!
//! In Clean Architecture the *application* layer sits between the domain
//! (pure rules: the coordinate transform and the wire format in
//! `cursor_core`) and the infrastructure (transports, pointer sources,
//! element geometry).
//!
//! Use cases in this layer:
//!
//! - **Orchestrate** domain functions to fulfil a user goal ("show my
//!   pointer to everyone in the room").
//! - **Depend on abstractions** (traits) rather than concrete implementations,
//!   so a browser bridge, a native window, or the in-memory loopback can be
//!   plugged in without changing this code.
//! - **Contain no OS calls and no socket I/O.**
//!
//! # Sub-modules
//!
//! - **`share_cursor`**  – The session: attach/detach lifecycle, outbound
//!   pointer pipeline and inbound frame handling.  Runs on every pointer
//!   sample and every peer message.
//!
//! - **`manage_peers`**  – The ordered registry of peer channels and the
//!   failure-isolating broadcast.
//!
//! - **`track_bounds`**  – Keeps the attached element's rectangle current.
//!
//! - **`throttle`**      – Coalesces bursts of pointer samples into at most one
//!   frame per interval.

pub mod manage_peers;
pub mod share_cursor;
pub mod throttle;
pub mod track_bounds;
