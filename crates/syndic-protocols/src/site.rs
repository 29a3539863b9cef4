use crate::kind::ProtocolKind;
use crate::result::ProtocolResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Which protocols a site publishes to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolFlags {
    pub mirror: bool,
    pub content_addressed: bool,
    pub peer_discovery: bool,
}

impl ProtocolFlags {
    pub fn all() -> Self {
        Self {
            mirror: true,
            content_addressed: true,
            peer_discovery: true,
        }
    }

    pub fn enabled(&self, kind: ProtocolKind) -> bool {
        match kind {
            ProtocolKind::Mirror => self.mirror,
            ProtocolKind::ContentAddressed => self.content_addressed,
            ProtocolKind::PeerDiscovery => self.peer_discovery,
        }
    }

    /// The enabled kinds, in stable order.
    pub fn kinds(&self) -> Vec<ProtocolKind> {
        ProtocolKind::ALL
            .into_iter()
            .filter(|kind| self.enabled(*kind))
            .collect()
    }
}

/// A site record as this crate consumes it: identity, protocol selection,
/// and the last-known publication result per protocol.
///
/// Persistence lives with the external config store; this type only defines
/// the shape and the update semantics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    pub id: String,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub protocols: ProtocolFlags,
    #[serde(default)]
    pub links: BTreeMap<ProtocolKind, ProtocolResult>,
}

impl Site {
    /// A fresh record with default protocol selection and no links.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn link_for(&self, kind: ProtocolKind) -> Option<&ProtocolResult> {
        self.links.get(&kind)
    }

    /// Record the latest sync result for its protocol.
    pub fn set_link(&mut self, result: ProtocolResult) {
        self.links.insert(result.kind(), result);
    }

    /// Forget the link after an unsync.
    pub fn clear_link(&mut self, kind: ProtocolKind) {
        self.links.remove(&kind);
    }

    /// Apply a patch, field by field: a set field replaces the previous
    /// value wholesale, an unset field keeps it. No deep merge — patching
    /// `protocols` overwrites the whole flag set.
    pub fn apply(&mut self, patch: SitePatch) {
        if let Some(domain) = patch.domain {
            self.domain = Some(domain);
        }
        if let Some(protocols) = patch.protocols {
            self.protocols = protocols;
        }
    }
}

/// Caller-supplied site update. Identity and links are not patchable: the
/// id is immutable and links belong to the sync/unsync flow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SitePatch {
    pub domain: Option<String>,
    pub protocols: Option<ProtocolFlags>,
}
