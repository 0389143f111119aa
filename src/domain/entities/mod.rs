//! Core domain entities.
//!
//! - [`ShortLink`] - A short code to long URL mapping
//! - [`Click`] - A durable click log record
//! - [`User`] - Link owner, created lazily by username
//!
//! Creation inputs use separate `New*` structs.

pub mod click;
pub mod link;
pub mod user;

pub use click::{Click, NewClick};
pub use link::{NewShortLink, ShortLink};
pub use user::User;
