//! State management module
//!
//! - `data.rs`: domain model shared by the gateway, store and UI
//! - `store.rs`: the snapshot and its transitions
//! - `drag.rs`: drag gesture state machine
//! - `notice.rs`: notifications shown to the operator

pub mod data;
pub mod drag;
pub mod notice;
pub mod store;
