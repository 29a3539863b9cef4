use serde::{Deserialize, Serialize};
use std::fmt;

/// A named permission tag a token may carry.
///
/// The set is closed: anything outside it fails payload deserialization, so
/// free-form capability strings can never reach the subset check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Capability {
    /// Full control, including token and site administration.
    Admin,
    /// Create and update site publications.
    Publisher,
    /// Re-issue tokens before they expire.
    Refresh,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Capability::Admin => "ADMIN",
            Capability::Publisher => "PUBLISHER",
            Capability::Refresh => "REFRESH",
        };
        f.write_str(s)
    }
}

/// Set-semantics subset check: every capability in `required` must appear in
/// `granted`. Order and duplicate entries in either slice are irrelevant.
pub fn subset(required: &[Capability], granted: &[Capability]) -> bool {
    required.iter().all(|cap| granted.contains(cap))
}

/// Render a capability list for human-readable messages.
pub fn list(capabilities: &[Capability]) -> String {
    capabilities
        .iter()
        .map(Capability::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
