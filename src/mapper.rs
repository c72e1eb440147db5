use crate::backend::{HubBackend, HubListing};
use crate::config::TopologyConfig;
use crate::error::Result;
use crate::prober::probe_hub;
use crate::snapshot::{SnapshotBuilder, TopologySnapshot};

const TAG: &str = " | mapper | ";

/// Runs enumeration passes against a backend.
///
/// Each call to [`TopologyMapper::enumerate`] returns its own snapshot, so
/// nothing is shared between passes or callers.
pub struct TopologyMapper<B: HubBackend> {
    backend: B,
    config: TopologyConfig,
}

impl<B: HubBackend> TopologyMapper<B> {
    pub fn new(backend: B) -> Self {
        Self::with_config(backend, TopologyConfig::default())
    }

    pub fn with_config(backend: B, config: TopologyConfig) -> Self {
        Self { backend, config }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Take a full snapshot: enumerate hubs, then probe each one in order.
    ///
    /// Fails only when the hub set itself cannot be produced. Per-hub and
    /// per-port failures show up in [`TopologySnapshot::skipped`].
    pub fn enumerate(&self) -> Result<TopologySnapshot> {
        let hubs = self.backend.enumerate_hubs()?;
        log::debug!("{TAG} {} hub interfaces present", hubs.len());

        let mut out = SnapshotBuilder::new(self.config.capacity);
        for listing in &hubs {
            match listing {
                HubListing::Resolved(hub) => {
                    let accepted = probe_hub(&self.backend, hub, &self.config, &mut out);
                    log::debug!("{TAG} hub {} contributed {} records", hub.ordinal, accepted);
                }
                HubListing::Unresolved { ordinal, error } => {
                    log::warn!("{TAG} hub {}: {}", ordinal, error);
                    out.skip(*ordinal, None, error.clone());
                }
            }
        }

        let snapshot = out.finish();
        log::info!(
            "{TAG} found {} attached devices across {} hubs ({} skipped probes{})",
            snapshot.count(),
            hubs.len(),
            snapshot.skipped().len(),
            if snapshot.is_truncated() { ", truncated" } else { "" }
        );
        Ok(snapshot)
    }
}

/// Mapper over the host's own USB stack.
#[cfg(windows)]
pub fn system_mapper(config: TopologyConfig) -> Result<TopologyMapper<crate::windows::WindowsBackend>> {
    Ok(TopologyMapper::with_config(crate::windows::WindowsBackend::new(), config))
}

/// Mapper over the host's own USB stack.
#[cfg(not(windows))]
pub fn system_mapper(_config: TopologyConfig) -> Result<TopologyMapper<UnsupportedBackend>> {
    Err(crate::error::TopologyError::UnsupportedPlatform)
}

/// Placeholder backend type for targets without hub enumeration support.
#[cfg(not(windows))]
pub enum UnsupportedBackend {}

#[cfg(not(windows))]
impl crate::backend::HubChannel for UnsupportedBackend {
    fn port_count(&mut self) -> Result<u8, crate::error::ProbeError> {
        match *self {}
    }

    fn connection(
        &mut self,
        _port: u32,
    ) -> Result<crate::backend::PortConnection, crate::error::ProbeError> {
        match *self {}
    }
}

#[cfg(not(windows))]
impl HubBackend for UnsupportedBackend {
    type Channel = UnsupportedBackend;

    fn enumerate_hubs(&self) -> Result<Vec<HubListing>> {
        match *self {}
    }

    fn open(
        &self,
        _hub: &crate::backend::HubDescriptor,
    ) -> Result<Self::Channel, crate::error::ProbeError> {
        match *self {}
    }
}
