use crate::record::{DESCRIPTION_LIMIT, PATH_LIMIT};

/// Default bound on records kept from one pass.
pub const DEFAULT_CAPACITY: usize = 256;

/// Knobs for an enumeration pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopologyConfig {
    /// Maximum number of records kept. `None` keeps everything.
    pub capacity: Option<usize>,
    /// Byte limit applied to each record's description.
    pub description_limit: usize,
    /// Byte limit applied to each record's hub path.
    pub path_limit: usize,
}

impl Default for TopologyConfig {
    fn default() -> Self {
        Self {
            capacity: Some(DEFAULT_CAPACITY),
            description_limit: DESCRIPTION_LIMIT,
            path_limit: PATH_LIMIT,
        }
    }
}

impl TopologyConfig {
    pub fn with_capacity(mut self, capacity: Option<usize>) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn unbounded() -> Self {
        Self::default().with_capacity(None)
    }
}
