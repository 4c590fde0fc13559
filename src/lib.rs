//! Courier - client console for long-running automation jobs
//!
//! Drives a remote automation backend: submits a job, then follows the
//! run step-by-step over a session-scoped push channel. The library
//! exposes the pieces individually (API client, channel manager,
//! timeline, view state) plus a `runner` that wires them together.

pub mod api;
pub mod channel;
pub mod config;
pub mod logging;
pub mod progress;
pub mod runner;
pub mod timeline;
pub mod types;
pub mod view;
