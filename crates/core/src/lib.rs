//! Domain types for the virtual fitting platform.
//!
//! Pure logic only: the fitting-record state machine, prompt construction,
//! the error taxonomy, and shared type aliases. No I/O lives here.

pub mod error;
pub mod fitting;
pub mod prompt;
pub mod types;
