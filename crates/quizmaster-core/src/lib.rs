//! Core types and trait definitions for Quiz Master.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! store backend and the web layer both depend on it.

pub mod account;
pub mod attempt;
pub mod catalog;
pub mod error;
pub mod store;

pub use attempt::grade;
pub use error::{Error, Result};
