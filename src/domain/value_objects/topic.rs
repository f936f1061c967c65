//! Event bridge topics.

use std::fmt;

/// A routing scope for published events: `room:<id>` or `user:<id>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    Room(i64),
    User(i64),
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Topic::Room(id) => write!(f, "room:{}", id),
            Topic::User(id) => write!(f, "user:{}", id),
        }
    }
}
