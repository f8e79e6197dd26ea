//! Infrastructure layer for the shared cursor session.
//!
//! Contains the adapters the session talks to: the peer transport that hands
//! out data channels, the pointer-event source, element geometry, and
//! file-system storage for configuration.
//!
//! **Dependency rule**: the `application` layer only sees the traits declared
//! here (`PeerTransport`, `DataChannel`, `PointerSource`, `GeometryProvider`).
//! Concrete adapters are injected when a session is built.

pub mod geometry;
pub mod pointer;
pub mod storage;
pub mod transport;
