//! Distribution-protocol plumbing for syndic.
//!
//! Every network a site publishes to (web mirror, content-addressed network,
//! peer-discovery swarm) sits behind the same [`ProtocolAdapter`] contract:
//! `load`, `unload`, `sync`, `unsync`, `stats`. The [`ProtocolManager`] owns
//! the adapter collection, fans lifecycle calls out concurrently, and keeps
//! concurrent syncs for the same (protocol, site) pair from racing. Which
//! protocols apply to a given site is the caller's decision, read from the
//! site configuration.

pub mod adapter;
pub mod error;
pub mod kind;
pub mod manager;
pub mod result;
pub mod site;

pub use adapter::{helpers, Ctx, ProtocolAdapter, SyncOptions};
pub use error::{ManagerError, ProtocolError};
pub use kind::ProtocolKind;
pub use manager::ProtocolManager;
pub use result::{ProtocolResult, ProtocolStats};
pub use site::{ProtocolFlags, Site, SitePatch};
