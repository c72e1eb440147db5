//! Hub discovery through SetupAPI.

use std::mem::{self, size_of};
use std::ptr;

use windows_sys::Win32::Devices::DeviceAndDriverInstallation::{
    SetupDiDestroyDeviceInfoList, SetupDiEnumDeviceInterfaces, SetupDiGetClassDevsW,
    SetupDiGetDeviceInterfaceDetailW, SetupDiGetDeviceRegistryPropertyW, DIGCF_DEVICEINTERFACE,
    DIGCF_PRESENT, HDEVINFO, SPDRP_DEVICEDESC, SPDRP_FRIENDLYNAME, SP_DEVICE_INTERFACE_DATA,
    SP_DEVICE_INTERFACE_DETAIL_DATA_W, SP_DEVINFO_DATA,
};
use windows_sys::Win32::Devices::Usb::GUID_DEVINTERFACE_USB_HUB;
use windows_sys::Win32::Foundation::{GetLastError, ERROR_NO_MORE_ITEMS, INVALID_HANDLE_VALUE};

use crate::backend::{HubDescriptor, HubListing};
use crate::error::{ProbeError, Result, TopologyError};
use crate::text::decode_wide;

const TAG: &str = " | setupapi | ";

/// Registry strings longer than this are cut; hub descriptions are short.
const PROPERTY_BUFFER_LEN: usize = 512;

/// Owned device information set, destroyed on drop.
struct DeviceInfoSet(HDEVINFO);

impl DeviceInfoSet {
    fn present_hubs() -> Result<Self> {
        let set = unsafe {
            SetupDiGetClassDevsW(
                &GUID_DEVINTERFACE_USB_HUB,
                ptr::null(),
                0,
                DIGCF_PRESENT | DIGCF_DEVICEINTERFACE,
            )
        };
        if set == INVALID_HANDLE_VALUE {
            let code = unsafe { GetLastError() };
            return Err(TopologyError::DeviceSetUnavailable { code });
        }
        Ok(Self(set))
    }

    fn interface(&self, index: u32) -> Option<SP_DEVICE_INTERFACE_DATA> {
        let mut data: SP_DEVICE_INTERFACE_DATA = unsafe { mem::zeroed() };
        data.cbSize = size_of::<SP_DEVICE_INTERFACE_DATA>() as u32;
        let ok = unsafe {
            SetupDiEnumDeviceInterfaces(self.0, ptr::null(), &GUID_DEVINTERFACE_USB_HUB, index, &mut data)
        };
        if ok == 0 {
            let code = unsafe { GetLastError() };
            if code != ERROR_NO_MORE_ITEMS {
                log::debug!("{TAG} interface walk stopped at {} (os error {})", index, code);
            }
            return None;
        }
        Some(data)
    }

    /// Device path of an interface plus the devinfo record that owns it.
    fn interface_path(
        &self,
        interface: &SP_DEVICE_INTERFACE_DATA,
    ) -> Result<(String, SP_DEVINFO_DATA), ProbeError> {
        let mut required = 0u32;
        unsafe {
            SetupDiGetDeviceInterfaceDetailW(
                self.0,
                interface,
                ptr::null_mut(),
                0,
                &mut required,
                ptr::null_mut(),
            );
        }
        if required == 0 {
            return Err(ProbeError::PathResolution { code: unsafe { GetLastError() } });
        }

        // u32 backing keeps the cbSize field aligned.
        let words = (required as usize).max(size_of::<SP_DEVICE_INTERFACE_DETAIL_DATA_W>()) / 4 + 1;
        let mut buffer = vec![0u32; words];
        let detail = buffer.as_mut_ptr() as *mut SP_DEVICE_INTERFACE_DETAIL_DATA_W;
        let mut devinfo: SP_DEVINFO_DATA = unsafe { mem::zeroed() };
        devinfo.cbSize = size_of::<SP_DEVINFO_DATA>() as u32;

        let ok = unsafe {
            (*detail).cbSize = size_of::<SP_DEVICE_INTERFACE_DETAIL_DATA_W>() as u32;
            SetupDiGetDeviceInterfaceDetailW(
                self.0,
                interface,
                detail,
                (buffer.len() * 4) as u32,
                ptr::null_mut(),
                &mut devinfo,
            )
        };
        if ok == 0 {
            return Err(ProbeError::PathResolution { code: unsafe { GetLastError() } });
        }

        let path = unsafe {
            let start = ptr::addr_of!((*detail).DevicePath) as *const u16;
            let offset = start as usize - buffer.as_ptr() as usize;
            let max_chars = (buffer.len() * 4 - offset) / 2;
            let chars = std::slice::from_raw_parts(start, max_chars);
            decode_wide(chars)
        };
        if path.is_empty() {
            return Err(ProbeError::PathResolution { code: 0 });
        }
        Ok((path, devinfo))
    }

    /// Device description, or friendly name, or empty.
    fn description(&self, devinfo: &SP_DEVINFO_DATA) -> String {
        [SPDRP_DEVICEDESC, SPDRP_FRIENDLYNAME]
            .into_iter()
            .find_map(|property| self.string_property(devinfo, property))
            .unwrap_or_default()
    }

    fn string_property(&self, devinfo: &SP_DEVINFO_DATA, property: u32) -> Option<String> {
        let mut buffer = [0u16; PROPERTY_BUFFER_LEN];
        let mut data_type = 0u32;
        let ok = unsafe {
            SetupDiGetDeviceRegistryPropertyW(
                self.0,
                devinfo,
                property,
                &mut data_type,
                buffer.as_mut_ptr() as *mut u8,
                (buffer.len() * 2) as u32,
                ptr::null_mut(),
            )
        };
        if ok == 0 {
            return None;
        }
        Some(decode_wide(&buffer)).filter(|s| !s.is_empty())
    }
}

impl Drop for DeviceInfoSet {
    fn drop(&mut self) {
        unsafe {
            SetupDiDestroyDeviceInfoList(self.0);
        }
    }
}

/// Walk all present USB hub interfaces in SetupAPI order.
pub(crate) fn enumerate_hubs() -> Result<Vec<HubListing>> {
    let set = DeviceInfoSet::present_hubs()?;
    let mut hubs = Vec::new();

    let mut index = 0u32;
    while let Some(interface) = set.interface(index) {
        let ordinal = index as usize;
        let listing = match set.interface_path(&interface) {
            Ok((open_path, devinfo)) => HubListing::Resolved(HubDescriptor {
                ordinal,
                friendly_name: set.description(&devinfo),
                open_path,
            }),
            Err(error) => HubListing::Unresolved { ordinal, error },
        };
        hubs.push(listing);
        index += 1;
    }

    Ok(hubs)
}
