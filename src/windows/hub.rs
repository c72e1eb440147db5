//! Channel to a single hub driven by hub-driver IOCTLs.

use std::ffi::{c_void, OsStr};
use std::mem::{self, size_of};
use std::os::windows::ffi::OsStrExt;
use std::ptr;

use windows_sys::Win32::Devices::Usb::{
    UsbHub, IOCTL_USB_GET_NODE_CONNECTION_INFORMATION_EX, IOCTL_USB_GET_NODE_INFORMATION,
    USB_NODE_CONNECTION_INFORMATION_EX, USB_NODE_INFORMATION,
};
use windows_sys::Win32::Foundation::{
    CloseHandle, GetLastError, GENERIC_READ, GENERIC_WRITE, HANDLE, INVALID_HANDLE_VALUE,
};
use windows_sys::Win32::Storage::FileSystem::{
    CreateFileW, FILE_SHARE_READ, FILE_SHARE_WRITE, OPEN_EXISTING,
};
use windows_sys::Win32::System::IO::DeviceIoControl;

use crate::backend::{ConnectionStatus, HubChannel, PortConnection};
use crate::error::ProbeError;

/// Open handle to a hub. Closed on drop.
pub struct HubHandle(HANDLE);

impl HubHandle {
    pub fn open(path: &str) -> Result<Self, ProbeError> {
        let wide: Vec<u16> = OsStr::new(path).encode_wide().chain(Some(0)).collect();
        let handle = unsafe {
            CreateFileW(
                wide.as_ptr(),
                GENERIC_READ | GENERIC_WRITE,
                FILE_SHARE_READ | FILE_SHARE_WRITE,
                ptr::null(),
                OPEN_EXISTING,
                0,
                0,
            )
        };
        if handle == INVALID_HANDLE_VALUE {
            return Err(ProbeError::Open { code: unsafe { GetLastError() } });
        }
        Ok(Self(handle))
    }

    /// Buffered IOCTL using `value` as both input and output.
    fn ioctl_in_place<T: Copy>(&self, code: u32, value: &mut T) -> Result<(), u32> {
        let mut returned = 0u32;
        let ok = unsafe {
            DeviceIoControl(
                self.0,
                code,
                value as *mut T as *const c_void,
                size_of::<T>() as u32,
                value as *mut T as *mut c_void,
                size_of::<T>() as u32,
                &mut returned,
                ptr::null_mut(),
            )
        };
        if ok == 0 {
            return Err(unsafe { GetLastError() });
        }
        Ok(())
    }
}

impl Drop for HubHandle {
    fn drop(&mut self) {
        unsafe {
            CloseHandle(self.0);
        }
    }
}

impl HubChannel for HubHandle {
    fn port_count(&mut self) -> Result<u8, ProbeError> {
        let mut info: USB_NODE_INFORMATION = unsafe { mem::zeroed() };
        self.ioctl_in_place(IOCTL_USB_GET_NODE_INFORMATION, &mut info)
            .map_err(|code| ProbeError::NodeInformation { code })?;

        // Composite parents answer the same query but have no ports.
        let node_type = info.NodeType;
        if node_type != UsbHub {
            return Ok(0);
        }
        Ok(unsafe { info.u.HubInformation.HubDescriptor.bNumberOfPorts })
    }

    fn connection(&mut self, port: u32) -> Result<PortConnection, ProbeError> {
        let mut info: USB_NODE_CONNECTION_INFORMATION_EX = unsafe { mem::zeroed() };
        info.ConnectionIndex = port;
        self.ioctl_in_place(IOCTL_USB_GET_NODE_CONNECTION_INFORMATION_EX, &mut info)
            .map_err(|code| ProbeError::ConnectionInformation { port, code })?;

        Ok(PortConnection {
            status: ConnectionStatus::from_raw(info.ConnectionStatus as u32),
            speed: info.Speed,
            device_is_hub: info.DeviceIsHub != 0,
            vendor_id: info.DeviceDescriptor.idVendor,
            product_id: info.DeviceDescriptor.idProduct,
        })
    }
}
