//! User entity.

/// Owner of short links, identified by a caller-supplied username.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub username: String,
}
