//! USB 后端抽象
//!
//! `UsbBackend` 负责枚举和 claim，`BulkHandle` 负责批量写入。真实实现见
//! `rusb_backend`，测试使用 `mock`。

use crate::descriptor::{EndpointSelection, UsbDeviceInfo, find_bulk_endpoints};
use crate::error::UsbError;
use std::time::Duration;
use tracing::{debug, trace};

/// 已 claim 接口的设备句柄
pub trait BulkHandle: Send {
    /// 批量写入，返回实际写入的字节数
    ///
    /// `timeout` 为 `Duration::ZERO` 表示无限等待。
    fn write_bulk(&mut self, endpoint: u8, data: &[u8], timeout: Duration) -> Result<usize, UsbError>;

    /// 释放已 claim 的接口（重复调用无副作用）
    fn release(&mut self);
}

/// 枚举得到的设备：描述符快照 + 后端自己的设备对象
pub struct Enumerated<D> {
    pub info: UsbDeviceInfo,
    pub device: D,
}

/// USB 后端
pub trait UsbBackend: Send + 'static {
    type Device: Send + 'static;
    type Handle: BulkHandle + 'static;

    /// 枚举当前连接的所有设备
    fn enumerate(&self) -> Result<Vec<Enumerated<Self::Device>>, UsbError>;

    /// 打开设备、分离内核驱动并 claim 选中的接口
    fn claim(&self, device: &Self::Device, selection: &EndpointSelection) -> Result<Self::Handle, UsbError>;
}

/// 已打开的逻辑端点
pub struct OpenedEndpoint<H> {
    pub handle: H,
    pub interface_number: u8,
    pub out_endpoint: u8,
    pub in_endpoint: Option<u8>,
}

impl<H> std::fmt::Debug for OpenedEndpoint<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenedEndpoint")
            .field("interface_number", &self.interface_number)
            .field("out_endpoint", &format_args!("0x{:02x}", self.out_endpoint))
            .field("in_endpoint", &self.in_endpoint)
            .finish_non_exhaustive()
    }
}

/// 解析并打开 VID/PID 对应的 Bulk 端点
///
/// 按枚举顺序尝试每个候选设备，返回第一个 claim 成功的端点。
pub fn open_bulk_endpoint<B: UsbBackend>(
    backend: &B,
    vendor_id: u16,
    product_id: u16,
) -> Result<OpenedEndpoint<B::Handle>, UsbError> {
    let devices = backend.enumerate()?;
    trace!("Enumerated {} USB devices", devices.len());

    let candidates = find_bulk_endpoints(devices.iter().map(|d| &d.info), vendor_id, product_id);
    if candidates.is_empty() {
        return Err(if devices.iter().any(|d| d.info.matches(vendor_id, product_id)) {
            UsbError::NoBulkEndpoint {
                vendor_id,
                product_id,
            }
        } else {
            UsbError::DeviceNotFound {
                vendor_id,
                product_id,
            }
        });
    }

    let mut last_err = None;
    for selection in candidates {
        let info = &devices[selection.device_index].info;
        match backend.claim(&devices[selection.device_index].device, &selection) {
            Ok(handle) => {
                debug!(
                    "Claimed {:04x}:{:04x} (bus {} addr {}) interface {} alt {} OUT 0x{:02x} IN {:?}",
                    vendor_id,
                    product_id,
                    info.bus_number,
                    info.address,
                    selection.interface_number,
                    selection.alt_setting,
                    selection.out_endpoint,
                    selection.in_endpoint
                );
                return Ok(OpenedEndpoint {
                    handle,
                    interface_number: selection.interface_number,
                    out_endpoint: selection.out_endpoint,
                    in_endpoint: selection.in_endpoint,
                });
            },
            Err(e) => {
                debug!(
                    "Failed to claim {:04x}:{:04x} on bus {} addr {}: {}",
                    vendor_id, product_id, info.bus_number, info.address, e
                );
                last_err = Some(e);
            },
        }
    }

    Err(last_err.unwrap_or(UsbError::DeviceNotFound {
        vendor_id,
        product_id,
    }))
}
