//! Seam between the enumeration core and the operating system.
//!
//! [`HubBackend`] plays the device-configuration subsystem (which hubs exist
//! and how to reach them); [`HubChannel`] is one open hub that can answer
//! node and per-port connection queries.

use crate::error::{ProbeError, Result};

/// A hub interface the OS reported, resolved far enough to be opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HubDescriptor {
    /// Position in the OS enumeration order of this pass.
    pub ordinal: usize,
    /// Path handed to the OS to open a channel to the hub.
    pub open_path: String,
    /// Best-effort description; empty when the OS has none.
    pub friendly_name: String,
}

/// One slot of the hub enumeration. Every enumerated interface gets an
/// ordinal, including the ones whose path could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HubListing {
    Resolved(HubDescriptor),
    Unresolved { ordinal: usize, error: ProbeError },
}

impl HubListing {
    pub fn ordinal(&self) -> usize {
        match self {
            HubListing::Resolved(hub) => hub.ordinal,
            HubListing::Unresolved { ordinal, .. } => *ordinal,
        }
    }
}

/// Connection status as reported by the hub driver for one port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    NoDevice,
    Connected,
    FailedEnumeration,
    GeneralFailure,
    Overcurrent,
    NotEnoughPower,
    NotEnoughBandwidth,
    HubNestedTooDeeply,
    InLegacyHub,
    Enumerating,
    Reset,
    Other(u32),
}

impl ConnectionStatus {
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            0 => ConnectionStatus::NoDevice,
            1 => ConnectionStatus::Connected,
            2 => ConnectionStatus::FailedEnumeration,
            3 => ConnectionStatus::GeneralFailure,
            4 => ConnectionStatus::Overcurrent,
            5 => ConnectionStatus::NotEnoughPower,
            6 => ConnectionStatus::NotEnoughBandwidth,
            7 => ConnectionStatus::HubNestedTooDeeply,
            8 => ConnectionStatus::InLegacyHub,
            9 => ConnectionStatus::Enumerating,
            10 => ConnectionStatus::Reset,
            other => ConnectionStatus::Other(other),
        }
    }

    pub fn is_connected(self) -> bool {
        self == ConnectionStatus::Connected
    }
}

/// Answer to a per-port connection query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortConnection {
    pub status: ConnectionStatus,
    /// Raw speed value from the driver; see [`crate::LinkSpeed::from_raw`].
    pub speed: u8,
    pub device_is_hub: bool,
    /// Zero when the device descriptor carried none.
    pub vendor_id: u16,
    pub product_id: u16,
}

/// An open channel to one hub. Dropping it closes the channel.
pub trait HubChannel {
    /// Number of downstream ports from the hub's node information.
    fn port_count(&mut self) -> Result<u8, ProbeError>;

    /// Connection information for a 1-based port.
    fn connection(&mut self, port: u32) -> Result<PortConnection, ProbeError>;
}

pub trait HubBackend {
    type Channel: HubChannel;

    /// List the hub interfaces currently present, in OS order. Only a
    /// failure to produce the device set at all is an error here.
    fn enumerate_hubs(&self) -> Result<Vec<HubListing>>;

    /// Open a channel to a resolved hub.
    fn open(&self, hub: &HubDescriptor) -> Result<Self::Channel, ProbeError>;
}
