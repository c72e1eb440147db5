use serde::{Serialize, Serializer};

use crate::backend::{HubDescriptor, PortConnection};
use crate::config::TopologyConfig;

/// Longest description kept on a record, in bytes.
pub const DESCRIPTION_LIMIT: usize = 255;
/// Longest hub path kept on a record, in bytes.
pub const PATH_LIMIT: usize = 511;

/// Negotiated link speed class of an attached device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkSpeed {
    Low,
    Full,
    High,
    Super,
    Unknown,
}

impl LinkSpeed {
    /// Map the speed value reported by the hub driver. Values the driver may
    /// add later land on `Unknown`.
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            0 => LinkSpeed::Low,
            1 => LinkSpeed::Full,
            2 => LinkSpeed::High,
            3 => LinkSpeed::Super,
            _ => LinkSpeed::Unknown,
        }
    }

    /// Normalized numeric scale: Low=0, Full=1, High=2, Super=3, Unknown=-1.
    pub fn code(self) -> i32 {
        match self {
            LinkSpeed::Low => 0,
            LinkSpeed::Full => 1,
            LinkSpeed::High => 2,
            LinkSpeed::Super => 3,
            LinkSpeed::Unknown => -1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LinkSpeed::Low => "Low Speed (1.5 Mbps)",
            LinkSpeed::Full => "Full Speed (12 Mbps)",
            LinkSpeed::High => "High Speed (480 Mbps)",
            LinkSpeed::Super => "Super Speed (5 Gbps)",
            LinkSpeed::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for LinkSpeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for LinkSpeed {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// One device seen on one port of one hub at snapshot time.
///
/// `device_path` is the path of the hub that was queried, not of the
/// attached device: the hub channel is the only thing opened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttachmentRecord {
    /// Position of the hub in this pass's discovery order.
    pub hub_index: usize,
    /// 1-based port on that hub.
    pub port_number: u32,
    pub description: String,
    pub device_path: String,
    pub is_hub: bool,
    pub speed: LinkSpeed,
    #[serde(serialize_with = "serialize_id")]
    pub vendor_id: u16,
    #[serde(serialize_with = "serialize_id")]
    pub product_id: u16,
}

impl AttachmentRecord {
    /// Build the record for a connected port, applying the text limits from
    /// `config`.
    pub fn from_connection(
        hub: &HubDescriptor,
        port_number: u32,
        connection: &PortConnection,
        config: &TopologyConfig,
    ) -> Self {
        let description = compose_description(&hub.friendly_name, port_number);
        Self {
            hub_index: hub.ordinal,
            port_number,
            description: truncate_text(&description, config.description_limit).to_string(),
            device_path: truncate_text(&hub.open_path, config.path_limit).to_string(),
            is_hub: connection.device_is_hub,
            speed: LinkSpeed::from_raw(connection.speed),
            vendor_id: connection.vendor_id,
            product_id: connection.product_id,
        }
    }

    /// `VVVV:PPPP` in lowercase hex, as lsusb prints it.
    pub fn vid_pid(&self) -> String {
        format!("{:04x}:{:04x}", self.vendor_id, self.product_id)
    }
}

fn serialize_id<S: Serializer>(id: &u16, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&format_args!("0x{:04X}", id))
}

/// Label for a port: the hub's own description plus the port number.
pub fn compose_description(hub_name: &str, port_number: u32) -> String {
    format!("Hub: {}, Port: {}", hub_name, port_number)
}

/// Cut `text` to at most `limit` bytes without splitting a character.
pub fn truncate_text(text: &str, limit: usize) -> &str {
    if text.len() <= limit {
        return text;
    }
    let mut end = limit;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
