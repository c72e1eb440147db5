use thiserror::Error;

/// Failures that end an enumeration pass. No snapshot is produced.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("the OS could not produce the USB hub device set (os error {code})")]
    DeviceSetUnavailable { code: u32 },

    #[error("USB hub enumeration is only available on Windows")]
    UnsupportedPlatform,

    #[error("failed to serialize topology: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures confined to a single hub or a single port. The pass keeps going
/// and the failure is recorded as a [`SkippedProbe`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    #[error("could not resolve hub interface path (os error {code})")]
    PathResolution { code: u32 },

    #[error("could not open hub channel (os error {code})")]
    Open { code: u32 },

    #[error("hub node information query failed (os error {code})")]
    NodeInformation { code: u32 },

    #[error("connection information query for port {port} failed (os error {code})")]
    ConnectionInformation { port: u32, code: u32 },
}

impl ProbeError {
    /// Raw OS error code behind this failure.
    pub fn os_code(&self) -> u32 {
        match self {
            ProbeError::PathResolution { code }
            | ProbeError::Open { code }
            | ProbeError::NodeInformation { code }
            | ProbeError::ConnectionInformation { code, .. } => *code,
        }
    }

    /// True when the failure took out a whole hub rather than one port.
    pub fn is_hub_level(&self) -> bool {
        !matches!(self, ProbeError::ConnectionInformation { .. })
    }
}

/// A hub or port that contributed no records because a query failed.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SkippedProbe {
    pub hub_index: usize,
    /// `None` when the whole hub was skipped.
    pub port_number: Option<u32>,
    #[serde(serialize_with = "serialize_display")]
    pub error: ProbeError,
}

fn serialize_display<S: serde::Serializer>(err: &ProbeError, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(err)
}

pub type Result<T, E = TopologyError> = std::result::Result<T, E>;
