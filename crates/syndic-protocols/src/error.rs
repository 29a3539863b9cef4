//! Protocol and manager failure taxonomy.
//!
//! Every adapter failure is scoped to its protocol kind; the manager's
//! aggregate errors carry the full per-protocol failure list so one
//! adapter's failure never collapses into an opaque blob.

use crate::kind::ProtocolKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("{kind} adapter load failed")]
    Load {
        kind: ProtocolKind,
        #[source]
        source: anyhow::Error,
    },

    #[error("{kind} adapter unload failed")]
    Unload {
        kind: ProtocolKind,
        #[source]
        source: anyhow::Error,
    },

    #[error("{kind} sync failed for site {site_id}")]
    Sync {
        kind: ProtocolKind,
        site_id: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("{kind} unsync failed for site {site_id}")]
    Unsync {
        kind: ProtocolKind,
        site_id: String,
        #[source]
        source: anyhow::Error,
    },
}

impl ProtocolError {
    pub fn load(kind: ProtocolKind, source: impl Into<anyhow::Error>) -> Self {
        Self::Load {
            kind,
            source: source.into(),
        }
    }

    pub fn unload(kind: ProtocolKind, source: impl Into<anyhow::Error>) -> Self {
        Self::Unload {
            kind,
            source: source.into(),
        }
    }

    pub fn sync(kind: ProtocolKind, site_id: &str, source: impl Into<anyhow::Error>) -> Self {
        Self::Sync {
            kind,
            site_id: site_id.to_string(),
            source: source.into(),
        }
    }

    pub fn unsync(kind: ProtocolKind, site_id: &str, source: impl Into<anyhow::Error>) -> Self {
        Self::Unsync {
            kind,
            site_id: site_id.to_string(),
            source: source.into(),
        }
    }

    /// The protocol this failure is scoped to.
    pub fn kind(&self) -> ProtocolKind {
        match self {
            Self::Load { kind, .. }
            | Self::Unload { kind, .. }
            | Self::Sync { kind, .. }
            | Self::Unsync { kind, .. } => *kind,
        }
    }
}

fn failed_kinds(failures: &[(ProtocolKind, ProtocolError)]) -> String {
    failures
        .iter()
        .map(|(kind, _)| kind.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Aggregate lifecycle failures. All adapter outcomes are awaited before one
/// of these is built, so the failure list is complete, not first-wins.
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("protocol load failed: {}", failed_kinds(.failures))]
    LoadFailed {
        failures: Vec<(ProtocolKind, ProtocolError)>,
    },

    #[error("protocol unload failed: {}", failed_kinds(.failures))]
    UnloadFailed {
        failures: Vec<(ProtocolKind, ProtocolError)>,
    },
}

impl ManagerError {
    /// Per-protocol failures behind this aggregate.
    pub fn failures(&self) -> &[(ProtocolKind, ProtocolError)] {
        match self {
            Self::LoadFailed { failures } | Self::UnloadFailed { failures } => failures,
        }
    }
}
