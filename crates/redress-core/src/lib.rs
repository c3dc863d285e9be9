//! Core types and trait definitions for the Redress complaint tracker.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod actor;
pub mod category;
pub mod complaint;
pub mod engine;
pub mod error;
pub mod feedback;
pub mod history;
pub mod lifecycle;
pub mod notification;
pub mod policy;
pub mod store;

pub use error::{Error, Result};
