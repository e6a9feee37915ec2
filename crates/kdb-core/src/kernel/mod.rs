//! # KDB Core Kernel
//!
//! Crate-wide constants and the aggregated [`Error`](error::Error) type that
//! every subsystem error converts into.
pub mod constants;
pub mod error;

pub use error::{Error, Result};
