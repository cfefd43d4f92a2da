//! System utilities
//!
//! Error types and field validation helpers.

pub mod errors;
pub mod validation;
