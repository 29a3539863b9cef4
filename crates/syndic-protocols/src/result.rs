use crate::kind::ProtocolKind;
use serde::{Deserialize, Serialize};

/// Outcome of one successful `sync`, one variant per protocol.
///
/// A variant's fields are always populated together; a partial shape is
/// never produced. Callers own these values and persist them in the site's
/// links map so a later `unsync` can hand the adapter its last-known state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "protocol")]
pub enum ProtocolResult {
    #[serde(rename = "mirror")]
    Mirror { enabled: bool, link: String },

    #[serde(rename = "content-addressed", rename_all = "camelCase")]
    ContentAddressed {
        enabled: bool,
        link: String,
        gateway: String,
        content_id: String,
        public_key: String,
        name_alias: String,
    },

    #[serde(rename = "peer-discovery", rename_all = "camelCase")]
    PeerDiscovery {
        enabled: bool,
        link: String,
        gateway: String,
        discovery_key: String,
        name_alias: String,
    },
}

impl ProtocolResult {
    pub fn kind(&self) -> ProtocolKind {
        match self {
            ProtocolResult::Mirror { .. } => ProtocolKind::Mirror,
            ProtocolResult::ContentAddressed { .. } => ProtocolKind::ContentAddressed,
            ProtocolResult::PeerDiscovery { .. } => ProtocolKind::PeerDiscovery,
        }
    }

    pub fn enabled(&self) -> bool {
        match self {
            ProtocolResult::Mirror { enabled, .. }
            | ProtocolResult::ContentAddressed { enabled, .. }
            | ProtocolResult::PeerDiscovery { enabled, .. } => *enabled,
        }
    }

    pub fn link(&self) -> &str {
        match self {
            ProtocolResult::Mirror { link, .. }
            | ProtocolResult::ContentAddressed { link, .. }
            | ProtocolResult::PeerDiscovery { link, .. } => link,
        }
    }
}

/// Lightweight live metrics for one (protocol, site) pair.
///
/// The zero value stands in whenever a protocol has no peer concept or the
/// site has no active session; `stats` never fails over that.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolStats {
    pub peer_count: u64,
}
