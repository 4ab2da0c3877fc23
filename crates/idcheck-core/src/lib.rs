//! IDCheck Core - expiry reporting for ID records kept in a 1Password vault
//!
//! This crate provides:
//! - A subprocess client for the `op` CLI with bounded retry on transient TLS failures
//! - A tolerant, typed schema for the loosely structured item JSON `op` returns
//! - Tag filtering and per-field record extraction with structured warnings
//! - Broken-first, expiry-ordered report assembly
//! - CSV and console output sinks

pub mod models;
pub mod config;
pub mod retry;
pub mod client;
pub mod filter;
pub mod extract;
pub mod sort;
pub mod report;
pub mod output;
pub mod error;

pub use models::*;
pub use config::*;
pub use retry::*;
pub use client::*;
pub use filter::*;
pub use extract::*;
pub use sort::*;
pub use report::*;
pub use output::*;
pub use error::*;
