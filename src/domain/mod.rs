//! Domain layer containing business entities and repository contracts.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`click_event`] - Click tracking event model
//!
//! # Click Processing Flow
//!
//! 1. Redirect handler resolves the short code
//! 2. A [`click_event::ClickEvent`] is submitted to the click queue (non-blocking)
//! 3. [`crate::workers::click_worker::run_click_worker`] persists it via
//!    [`repositories::ClickRepository`]; failures are logged and dropped

pub mod click_event;
pub mod entities;
pub mod repositories;
