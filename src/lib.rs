//! Physical USB topology snapshots: which hub and port every attached device
//! sits on, at what link speed, with its vendor/product identity.

pub mod backend;
pub mod config;
pub mod error;
pub mod mapper;
pub mod prober;
pub mod record;
pub mod report;
pub mod snapshot;
pub mod text;

#[cfg(windows)]
pub mod windows;

pub use backend::{ConnectionStatus, HubBackend, HubChannel, HubDescriptor, HubListing, PortConnection};
pub use config::TopologyConfig;
pub use error::{ProbeError, SkippedProbe, TopologyError};
pub use mapper::{system_mapper, TopologyMapper};
pub use record::{AttachmentRecord, LinkSpeed};
pub use snapshot::TopologySnapshot;

/// Take a snapshot of the host's USB topology with default settings.
pub fn enumerate() -> error::Result<TopologySnapshot> {
    system_mapper(TopologyConfig::default())?.enumerate()
}
