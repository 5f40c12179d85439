//! Core types and trait definitions for the Tally grading engine.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod actor;
pub mod error;
pub mod rubric;
pub mod score;
pub mod seed;
pub mod stats;
pub mod store;
pub mod submission;
pub mod workflow;

pub use error::{AsGradingError, Error, ErrorKind, Result};
