use crate::backend::{HubBackend, HubChannel, HubDescriptor};
use crate::config::TopologyConfig;
use crate::error::ProbeError;
use crate::record::AttachmentRecord;
use crate::snapshot::SnapshotBuilder;

const TAG: &str = " | prober | ";

/// Scan every port of one hub and append a record per connected port.
///
/// Open and node-information failures skip the hub; a failed port query
/// skips that port only. The channel is dropped, and so closed, before this
/// returns on every path. Returns the number of records accepted.
pub fn probe_hub<B: HubBackend>(
    backend: &B,
    hub: &HubDescriptor,
    config: &TopologyConfig,
    out: &mut SnapshotBuilder,
) -> usize {
    let mut channel = match backend.open(hub) {
        Ok(channel) => channel,
        Err(e) => {
            log::warn!("{TAG} hub {} ({}): {}", hub.ordinal, hub.open_path, e);
            out.skip(hub.ordinal, None, e);
            return 0;
        }
    };

    let port_count = match channel.port_count() {
        Ok(count) => count,
        Err(e) => {
            log::warn!("{TAG} hub {} ({}): {}", hub.ordinal, hub.open_path, e);
            out.skip(hub.ordinal, None, e);
            return 0;
        }
    };
    log::debug!("{TAG} hub {} '{}' has {} ports", hub.ordinal, hub.friendly_name, port_count);

    let mut accepted = 0;
    for port in 1..=u32::from(port_count) {
        match scan_port(&mut channel, hub, port, config) {
            Ok(Some(record)) => {
                if out.push(record) {
                    accepted += 1;
                }
            }
            Ok(None) => {}
            Err(e) => {
                log::warn!("{TAG} hub {} port {}: {}", hub.ordinal, port, e);
                out.skip(hub.ordinal, Some(port), e);
            }
        }
    }
    accepted
}

fn scan_port<C: HubChannel>(
    channel: &mut C,
    hub: &HubDescriptor,
    port: u32,
    config: &TopologyConfig,
) -> Result<Option<AttachmentRecord>, ProbeError> {
    let connection = channel.connection(port)?;
    if !connection.status.is_connected() {
        log::debug!("{TAG} hub {} port {}: {:?}", hub.ordinal, port, connection.status);
        return Ok(None);
    }
    let record = AttachmentRecord::from_connection(hub, port, &connection, config);
    log::debug!(
        "{TAG} hub {} port {}: {} {} hub={}",
        hub.ordinal,
        port,
        record.vid_pid(),
        record.speed,
        record.is_hub
    );
    Ok(Some(record))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{ConnectionStatus, HubListing, PortConnection};
    use crate::error::Result;
    use crate::record::LinkSpeed;
    use std::cell::Cell;
    use std::rc::Rc;

    struct FakeChannel {
        ports: Vec<Result<PortConnection, ProbeError>>,
        node_error: Option<ProbeError>,
        closed: Rc<Cell<u32>>,
    }

    impl HubChannel for FakeChannel {
        fn port_count(&mut self) -> Result<u8, ProbeError> {
            match &self.node_error {
                Some(e) => Err(e.clone()),
                None => Ok(self.ports.len() as u8),
            }
        }

        fn connection(&mut self, port: u32) -> Result<PortConnection, ProbeError> {
            self.ports[port as usize - 1].clone()
        }
    }

    impl Drop for FakeChannel {
        fn drop(&mut self) {
            self.closed.set(self.closed.get() + 1);
        }
    }

    struct FakeBackend {
        ports: Vec<Result<PortConnection, ProbeError>>,
        node_error: Option<ProbeError>,
        open_error: Option<ProbeError>,
        closed: Rc<Cell<u32>>,
    }

    impl FakeBackend {
        fn new(ports: Vec<Result<PortConnection, ProbeError>>) -> Self {
            Self {
                ports,
                node_error: None,
                open_error: None,
                closed: Rc::new(Cell::new(0)),
            }
        }
    }

    impl HubBackend for FakeBackend {
        type Channel = FakeChannel;

        fn enumerate_hubs(&self) -> Result<Vec<HubListing>> {
            Ok(vec![HubListing::Resolved(hub())])
        }

        fn open(&self, _hub: &HubDescriptor) -> Result<FakeChannel, ProbeError> {
            if let Some(e) = &self.open_error {
                return Err(e.clone());
            }
            Ok(FakeChannel {
                ports: self.ports.clone(),
                node_error: self.node_error.clone(),
                closed: Rc::clone(&self.closed),
            })
        }
    }

    fn hub() -> HubDescriptor {
        HubDescriptor {
            ordinal: 0,
            open_path: r"\\?\usb#vid_8087".to_string(),
            friendly_name: "Generic USB Hub".to_string(),
        }
    }

    fn port(status: ConnectionStatus, speed: u8) -> Result<PortConnection, ProbeError> {
        Ok(PortConnection {
            status,
            speed,
            device_is_hub: false,
            vendor_id: 0x046d,
            product_id: 0xc52b,
        })
    }

    #[test]
    fn test_only_connected_ports_emit() {
        let backend = FakeBackend::new(vec![
            port(ConnectionStatus::Connected, 1),
            port(ConnectionStatus::NoDevice, 0),
            port(ConnectionStatus::FailedEnumeration, 0),
            port(ConnectionStatus::Connected, 3),
        ]);
        let mut out = SnapshotBuilder::new(None);
        assert_eq!(probe_hub(&backend, &hub(), &TopologyConfig::default(), &mut out), 2);
        let snapshot = out.finish();
        let ports: Vec<u32> = snapshot.records().iter().map(|r| r.port_number).collect();
        assert_eq!(ports, vec![1, 4]);
        assert_eq!(snapshot.records()[1].speed, LinkSpeed::Super);
        assert_eq!(backend.closed.get(), 1);
    }

    #[test]
    fn test_failed_port_query_skips_only_that_port() {
        let backend = FakeBackend::new(vec![
            Err(ProbeError::ConnectionInformation { port: 1, code: 31 }),
            port(ConnectionStatus::Connected, 2),
        ]);
        let mut out = SnapshotBuilder::new(None);
        probe_hub(&backend, &hub(), &TopologyConfig::default(), &mut out);
        let snapshot = out.finish();
        assert_eq!(snapshot.count(), 1);
        assert_eq!(snapshot.records()[0].port_number, 2);
        assert_eq!(snapshot.skipped().len(), 1);
        assert_eq!(snapshot.skipped()[0].port_number, Some(1));
    }

    #[test]
    fn test_node_information_failure_closes_channel() {
        let mut backend = FakeBackend::new(vec![port(ConnectionStatus::Connected, 1)]);
        backend.node_error = Some(ProbeError::NodeInformation { code: 1 });
        let mut out = SnapshotBuilder::new(None);
        assert_eq!(probe_hub(&backend, &hub(), &TopologyConfig::default(), &mut out), 0);
        assert_eq!(backend.closed.get(), 1);
        let snapshot = out.finish();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.skipped()[0].port_number, None);
    }

    #[test]
    fn test_open_failure_skips_hub() {
        let mut backend = FakeBackend::new(vec![port(ConnectionStatus::Connected, 1)]);
        backend.open_error = Some(ProbeError::Open { code: 5 });
        let mut out = SnapshotBuilder::new(None);
        assert_eq!(probe_hub(&backend, &hub(), &TopologyConfig::default(), &mut out), 0);
        assert_eq!(backend.closed.get(), 0);
        assert_eq!(out.finish().skipped()[0].error, ProbeError::Open { code: 5 });
    }
}
