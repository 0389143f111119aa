//! Utility functions for code generation and request handling.
//!
//! - [`code_generator`] - Short code generation and validation
//! - [`client_ip`] - Client address extraction for rate limiting and click logs

pub mod client_ip;
pub mod code_generator;
