//! Caller identity
//!
//! Every request is evaluated against a concrete identity: either an
//! authenticated user or the anonymous `Guest`.

use std::sync::LazyLock;

pub const GUEST_NAME: &str = "Guest";

static GUEST_GROUPS: LazyLock<Vec<String>> = LazyLock::new(|| vec![GUEST_NAME.to_string()]);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    /// Anonymous caller, member of the `Guest` group only.
    Guest,
    User { name: String, groups: Vec<String> },
}

impl Identity {
    pub fn user(name: impl Into<String>, groups: Vec<String>) -> Self {
        Identity::User {
            name: name.into(),
            groups,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Identity::Guest => GUEST_NAME,
            Identity::User { name, .. } => name,
        }
    }

    pub fn groups(&self) -> &[String] {
        match self {
            Identity::Guest => GUEST_GROUPS.as_slice(),
            Identity::User { groups, .. } => groups.as_slice(),
        }
    }

    pub fn is_guest(&self) -> bool {
        matches!(self, Identity::Guest)
    }
}
