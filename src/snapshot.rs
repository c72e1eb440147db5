use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{ProbeError, SkippedProbe};
use crate::record::AttachmentRecord;

const TAG: &str = " | snapshot | ";

/// Everything one enumeration pass observed. Each pass builds a fresh one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TopologySnapshot {
    records: Vec<AttachmentRecord>,
    skipped: Vec<SkippedProbe>,
    truncated: bool,
}

impl TopologySnapshot {
    pub fn count(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record at `index`, or `None` outside `[0, count)`.
    pub fn get_record(&self, index: usize) -> Option<&AttachmentRecord> {
        self.records.get(index)
    }

    pub fn records(&self) -> &[AttachmentRecord] {
        &self.records
    }

    /// Hubs and ports whose queries failed during the pass.
    pub fn skipped(&self) -> &[SkippedProbe] {
        &self.skipped
    }

    /// True when records were dropped because the capacity bound was hit.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Records grouped by hub index, in port order within each hub.
    pub fn hub_groups(&self) -> BTreeMap<usize, Vec<&AttachmentRecord>> {
        let mut groups: BTreeMap<usize, Vec<&AttachmentRecord>> = BTreeMap::new();
        for record in &self.records {
            groups.entry(record.hub_index).or_default().push(record);
        }
        for ports in groups.values_mut() {
            ports.sort_by_key(|r| r.port_number);
        }
        groups
    }
}

/// Accumulates records under the capacity bound.
#[derive(Debug)]
pub struct SnapshotBuilder {
    capacity: Option<usize>,
    snapshot: TopologySnapshot,
}

impl SnapshotBuilder {
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            capacity,
            snapshot: TopologySnapshot::default(),
        }
    }

    pub fn is_full(&self) -> bool {
        matches!(self.capacity, Some(cap) if self.snapshot.records.len() >= cap)
    }

    /// Append a record. Returns false, and marks the snapshot truncated, when
    /// the bound has already been reached.
    pub fn push(&mut self, record: AttachmentRecord) -> bool {
        if self.is_full() {
            if !self.snapshot.truncated {
                log::warn!(
                    "{TAG} capacity of {} records reached, dropping hub {} port {} and anything after it",
                    self.snapshot.records.len(),
                    record.hub_index,
                    record.port_number
                );
            }
            self.snapshot.truncated = true;
            return false;
        }
        self.snapshot.records.push(record);
        true
    }

    pub fn skip(&mut self, hub_index: usize, port_number: Option<u32>, error: ProbeError) {
        self.snapshot.skipped.push(SkippedProbe {
            hub_index,
            port_number,
            error,
        });
    }

    pub fn finish(self) -> TopologySnapshot {
        self.snapshot
    }
}
