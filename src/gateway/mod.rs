//! Remote Gateway
//!
//! The only code that talks to the classification service. Every call is
//! a single request/response exchange: no retries, no timeout beyond the
//! transport default.

pub mod client;
pub mod wire;

pub use client::Gateway;
