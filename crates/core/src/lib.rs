//! Domain building blocks shared by every Copydesk crate.
//!
//! Holds the error type, identifier and timestamp aliases, the project
//! lifecycle rules, and the input validation helpers. Nothing in here does
//! I/O.

pub mod error;
pub mod lifecycle;
pub mod outcome;
pub mod types;
pub mod validation;
