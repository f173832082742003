//! Core types and pure logic for the SPI → SIMS migration engine.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod error;
pub mod person;
pub mod species;
pub mod stage;

pub use error::{Error, Result};
