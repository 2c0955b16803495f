//! 基于 rusb (libusb) 的后端实现

use crate::backend::{BulkHandle, Enumerated, UsbBackend};
use crate::descriptor::{AltSettingInfo, EndpointInfo, EndpointSelection, InterfaceInfo, UsbDeviceInfo};
use crate::error::UsbError;
use rusb::{Context, Device, DeviceHandle, UsbContext};
use std::time::Duration;
use tracing::{trace, warn};

/// rusb 后端，持有独立的 libusb 上下文
///
/// 上下文在后端被 drop 时销毁，因此所有句柄必须先于后端释放。
pub struct RusbBackend {
    context: Context,
}

impl RusbBackend {
    /// 初始化 libusb 上下文
    ///
    /// 失败意味着系统 USB 子系统不可用，调用方应视为致命错误。
    pub fn new() -> Result<Self, UsbError> {
        Ok(Self {
            context: Context::new()?,
        })
    }

    pub fn context(&self) -> &Context {
        &self.context
    }
}

fn snapshot_interfaces(device: &Device<Context>) -> Vec<InterfaceInfo> {
    let config = match device.active_config_descriptor().or_else(|_| device.config_descriptor(0)) {
        Ok(config) => config,
        Err(e) => {
            trace!("Cannot read config descriptor: {}", e);
            return Vec::new();
        },
    };

    config
        .interfaces()
        .map(|interface| InterfaceInfo {
            number: interface.number(),
            alt_settings: interface
                .descriptors()
                .map(|alt| AltSettingInfo {
                    setting: alt.setting_number(),
                    endpoints: alt
                        .endpoint_descriptors()
                        .map(|ep| EndpointInfo {
                            address: ep.address(),
                            transfer_type: ep.transfer_type(),
                        })
                        .collect(),
                })
                .collect(),
        })
        .collect()
}

impl UsbBackend for RusbBackend {
    type Device = Device<Context>;
    type Handle = RusbHandle;

    fn enumerate(&self) -> Result<Vec<Enumerated<Self::Device>>, UsbError> {
        let list = self.context.devices()?;
        let mut devices = Vec::with_capacity(list.len());

        for device in list.iter() {
            let desc = match device.device_descriptor() {
                Ok(desc) => desc,
                Err(_) => continue,
            };

            let info = UsbDeviceInfo {
                vendor_id: desc.vendor_id(),
                product_id: desc.product_id(),
                bus_number: device.bus_number(),
                address: device.address(),
                interfaces: snapshot_interfaces(&device),
            };
            devices.push(Enumerated { info, device });
        }

        Ok(devices)
    }

    fn claim(&self, device: &Self::Device, selection: &EndpointSelection) -> Result<Self::Handle, UsbError> {
        let mut handle = device.open()?;
        let interface_number = selection.interface_number;

        // 1. Detach kernel driver（在 claim 之前）
        #[cfg(any(target_os = "linux", target_os = "macos"))]
        {
            if handle.kernel_driver_active(interface_number).unwrap_or(false) {
                handle.detach_kernel_driver(interface_number)?;
                trace!("Detached kernel driver from interface {}", interface_number);
            }
        }

        // 2. Claim interface
        handle.claim_interface(interface_number)?;

        // 3. 非默认备用设置需要显式切换
        if selection.alt_setting != 0
            && let Err(e) = handle.set_alternate_setting(interface_number, selection.alt_setting)
        {
            let _ = handle.release_interface(interface_number);
            return Err(e.into());
        }

        Ok(RusbHandle {
            handle,
            interface_number,
            claimed: true,
        })
    }
}

/// rusb 设备句柄
pub struct RusbHandle {
    handle: DeviceHandle<Context>,
    interface_number: u8,
    claimed: bool,
}

impl BulkHandle for RusbHandle {
    fn write_bulk(&mut self, endpoint: u8, data: &[u8], timeout: Duration) -> Result<usize, UsbError> {
        match self.handle.write_bulk(endpoint, data, timeout) {
            Ok(n) => Ok(n),
            Err(rusb::Error::Timeout) => {
                // 超时后端点可能处于 STALL 状态，清除 halt 以便后续传输
                if let Err(clear_err) = self.handle.clear_halt(endpoint) {
                    warn!("Failed to clear endpoint halt after timeout: {}", clear_err);
                }
                Err(UsbError::Usb(rusb::Error::Timeout))
            },
            Err(e) => Err(UsbError::Usb(e)),
        }
    }

    fn release(&mut self) {
        if self.claimed {
            // 设备可能已断开，忽略错误
            let _ = self.handle.release_interface(self.interface_number);
            self.claimed = false;
            trace!("[Release] USB interface {} released", self.interface_number);
        }
    }
}

impl Drop for RusbHandle {
    fn drop(&mut self) {
        self.release();
    }
}
