use serde::{Deserialize, Serialize};
use std::fmt;

/// The distribution networks a site can publish to. Also the wire tag on
/// [`crate::ProtocolResult`] and the key of a site's links map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ProtocolKind {
    /// Conventional web mirror.
    #[serde(rename = "mirror")]
    Mirror,
    /// Content-addressed network: hash-derived identifiers plus an optional
    /// mutable name alias.
    #[serde(rename = "content-addressed")]
    ContentAddressed,
    /// Peer-discovery swarm: content located via a discovery key, with a
    /// live peer count.
    #[serde(rename = "peer-discovery")]
    PeerDiscovery,
}

impl ProtocolKind {
    pub const ALL: [ProtocolKind; 3] = [
        ProtocolKind::Mirror,
        ProtocolKind::ContentAddressed,
        ProtocolKind::PeerDiscovery,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProtocolKind::Mirror => "mirror",
            ProtocolKind::ContentAddressed => "content-addressed",
            ProtocolKind::PeerDiscovery => "peer-discovery",
        }
    }
}

impl fmt::Display for ProtocolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
