//! Windows backend: SetupAPI for hub discovery, hub-driver IOCTLs for ports.

mod hub;
mod setup;

pub use hub::HubHandle;

use crate::backend::{HubBackend, HubDescriptor, HubListing};
use crate::error::{ProbeError, Result};

#[derive(Debug, Default, Clone, Copy)]
pub struct WindowsBackend;

impl WindowsBackend {
    pub fn new() -> Self {
        Self
    }
}

impl HubBackend for WindowsBackend {
    type Channel = HubHandle;

    fn enumerate_hubs(&self) -> Result<Vec<HubListing>> {
        setup::enumerate_hubs()
    }

    fn open(&self, hub: &HubDescriptor) -> Result<HubHandle, ProbeError> {
        HubHandle::open(&hub.open_path)
    }
}
