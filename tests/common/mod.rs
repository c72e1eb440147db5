#![allow(dead_code)]

use std::cell::Cell;
use std::rc::Rc;

use usb_topology::{
    ConnectionStatus, HubBackend, HubChannel, HubDescriptor, HubListing, PortConnection, ProbeError,
    TopologyError,
};

/// What a scripted hub answers to each query.
#[derive(Clone)]
pub enum ScriptedHub {
    Ports(Vec<Result<PortConnection, ProbeError>>),
    NodeInformationFails(u32),
    OpenFails(u32),
    PathFails(u32),
}

/// In-memory stand-in for the OS hub stack.
pub struct ScriptedBackend {
    hubs: Vec<ScriptedHub>,
    device_set_error: Option<u32>,
    pub opened: Rc<Cell<u32>>,
    pub closed: Rc<Cell<u32>>,
}

impl ScriptedBackend {
    pub fn new(hubs: Vec<ScriptedHub>) -> Self {
        Self {
            hubs,
            device_set_error: None,
            opened: Rc::new(Cell::new(0)),
            closed: Rc::new(Cell::new(0)),
        }
    }

    pub fn without_device_set(code: u32) -> Self {
        let mut backend = Self::new(Vec::new());
        backend.device_set_error = Some(code);
        backend
    }
}

pub struct ScriptedChannel {
    script: ScriptedHub,
    closed: Rc<Cell<u32>>,
}

impl HubChannel for ScriptedChannel {
    fn port_count(&mut self) -> Result<u8, ProbeError> {
        match &self.script {
            ScriptedHub::Ports(ports) => Ok(ports.len() as u8),
            ScriptedHub::NodeInformationFails(code) => Err(ProbeError::NodeInformation { code: *code }),
            _ => unreachable!("channel only exists for openable hubs"),
        }
    }

    fn connection(&mut self, port: u32) -> Result<PortConnection, ProbeError> {
        match &self.script {
            ScriptedHub::Ports(ports) => ports[port as usize - 1].clone(),
            _ => unreachable!("ports are only queried after a port count"),
        }
    }
}

impl Drop for ScriptedChannel {
    fn drop(&mut self) {
        self.closed.set(self.closed.get() + 1);
    }
}

impl HubBackend for ScriptedBackend {
    type Channel = ScriptedChannel;

    fn enumerate_hubs(&self) -> Result<Vec<HubListing>, TopologyError> {
        if let Some(code) = self.device_set_error {
            return Err(TopologyError::DeviceSetUnavailable { code });
        }
        Ok(self
            .hubs
            .iter()
            .enumerate()
            .map(|(ordinal, hub)| match hub {
                ScriptedHub::PathFails(code) => HubListing::Unresolved {
                    ordinal,
                    error: ProbeError::PathResolution { code: *code },
                },
                _ => HubListing::Resolved(HubDescriptor {
                    ordinal,
                    open_path: format!(r"\\?\usb#hub{}", ordinal),
                    friendly_name: format!("Hub {}", ordinal),
                }),
            })
            .collect())
    }

    fn open(&self, hub: &HubDescriptor) -> Result<ScriptedChannel, ProbeError> {
        let script = self.hubs[hub.ordinal].clone();
        if let ScriptedHub::OpenFails(code) = script {
            return Err(ProbeError::Open { code });
        }
        self.opened.set(self.opened.get() + 1);
        Ok(ScriptedChannel {
            script,
            closed: Rc::clone(&self.closed),
        })
    }
}

pub fn device(speed: u8, vendor_id: u16, product_id: u16) -> Result<PortConnection, ProbeError> {
    Ok(PortConnection {
        status: ConnectionStatus::Connected,
        speed,
        device_is_hub: false,
        vendor_id,
        product_id,
    })
}

pub fn hub_device(speed: u8, vendor_id: u16, product_id: u16) -> Result<PortConnection, ProbeError> {
    device(speed, vendor_id, product_id).map(|mut c| {
        c.device_is_hub = true;
        c
    })
}

pub fn empty_port() -> Result<PortConnection, ProbeError> {
    Ok(PortConnection {
        status: ConnectionStatus::NoDevice,
        speed: 0,
        device_is_hub: false,
        vendor_id: 0,
        product_id: 0,
    })
}
