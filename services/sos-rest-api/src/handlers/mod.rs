//! HTTP request handlers for the SOS REST API.

pub mod health;
pub mod observations;
