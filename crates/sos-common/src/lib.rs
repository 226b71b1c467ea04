//! Common types and utilities shared across the SOS REST binding crates.

pub mod config;
pub mod envelope;
pub mod error;
pub mod srs;
pub mod time;

pub use config::BindingConfig;
pub use envelope::Envelope;
pub use error::{SosError, SosResult};
pub use time::TimeValue;
