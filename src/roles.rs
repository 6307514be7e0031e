//! Role normalization
//!
//! Stored role values come from an open set: the current canonical codes plus
//! free-text labels written by older versions of the application. Everything
//! is normalized on read to one of three canonical roles; nothing is written
//! back.

use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Canonical permission level used throughout the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CanonicalRole {
    SuperManager,
    Admin,
    Member,
    /// Unmatched input; renders as an empty label
    Unknown,
}

impl CanonicalRole {
    /// Stored code for this role (empty for `Unknown`)
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            CanonicalRole::SuperManager => "SUPER_MANAGER",
            CanonicalRole::Admin => "ADMIN",
            CanonicalRole::Member => "MEMBER",
            CanonicalRole::Unknown => "",
        }
    }

    /// Display label for this role (empty for `Unknown`)
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            CanonicalRole::SuperManager => "Super Manager",
            CanonicalRole::Admin => "Admin",
            CanonicalRole::Member => "Member",
            CanonicalRole::Unknown => "",
        }
    }

    #[must_use]
    pub fn is_known(self) -> bool {
        self != CanonicalRole::Unknown
    }
}

impl fmt::Display for CanonicalRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// Legacy labels are matched exactly. "Super Admin" and "Manager" were
// renamed when the role codes were introduced and keep their old meaning.
const LEGACY_LABELS: &[(&str, CanonicalRole)] = &[
    ("Super Manager", CanonicalRole::SuperManager),
    ("Super Admin", CanonicalRole::SuperManager),
    ("Manager", CanonicalRole::Admin),
    ("User", CanonicalRole::Member),
];

/// Normalize a raw stored role value
#[must_use]
pub fn normalize(raw: Option<&str>) -> CanonicalRole {
    let Some(raw) = raw else {
        return CanonicalRole::Unknown;
    };

    let trimmed = raw.trim();
    for role in [
        CanonicalRole::SuperManager,
        CanonicalRole::Admin,
        CanonicalRole::Member,
    ] {
        if trimmed.eq_ignore_ascii_case(role.code()) {
            return role;
        }
    }

    LEGACY_LABELS
        .iter()
        .find(|(label, _)| *label == trimmed)
        .map_or(CanonicalRole::Unknown, |(_, role)| *role)
}

/// Normalize an untyped value; non-strings are `Unknown`
#[must_use]
pub fn normalize_value(raw: &Value) -> CanonicalRole {
    normalize(raw.as_str())
}
