//! Voice Bridge Gateway Library Crate
//!
//! Everything around the core pipeline that talks to the contact-center
//! platform: configuration, the OAuth handshake, the envelope protocol and the
//! WebSocket session loop, and the startup sequence tying them together in
//! [`app::run`]. The `gateway` binary is a thin wrapper around this
//! library.

pub mod app;
pub mod auth;
pub mod config;
pub mod protocol;
pub mod session;
