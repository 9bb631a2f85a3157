//! Storage permissions
//!
//! Read/write rules attached to each storage and the group check that
//! evaluates them.

use serde::Deserialize;

/// Which rule of a storage a request is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
}

impl Access {
    pub fn as_str(&self) -> &'static str {
        match self {
            Access::Read => "read",
            Access::Write => "write",
        }
    }
}

/// Permission rule decoded once from the configuration strings
/// `"none"`, `"all"` or a group name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum PermissionRule {
    /// Denies every caller, authenticated or not.
    #[default]
    None,
    /// Allows every caller, including anonymous ones.
    All,
    /// Allows callers that belong to the named group.
    Group(String),
}

impl TryFrom<String> for PermissionRule {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "" => Err("permission rule cannot be empty".to_string()),
            "none" => Ok(PermissionRule::None),
            "all" => Ok(PermissionRule::All),
            _ => Ok(PermissionRule::Group(value)),
        }
    }
}

/// Returns whether a caller holding `groups` satisfies `rule`.
pub fn authorize<S: AsRef<str>>(rule: &PermissionRule, groups: &[S]) -> bool {
    match rule {
        PermissionRule::None => false,
        PermissionRule::All => true,
        PermissionRule::Group(group) => groups.iter().any(|g| g.as_ref() == group),
    }
}
