//! HTTP boundary to the automation backend.

mod client;
mod error;

pub use client::BackendClient;
pub use error::SubmitError;
