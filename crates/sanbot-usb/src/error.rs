//! USB 错误类型

use thiserror::Error;

/// USB 错误类型
#[derive(Error, Debug)]
pub enum UsbError {
    /// USB 错误（来自 rusb）
    #[error("USB error: {0}")]
    Usb(#[from] rusb::Error),

    /// 没有匹配 VID/PID 的设备
    #[error("Device {vendor_id:04x}:{product_id:04x} not found")]
    DeviceNotFound { vendor_id: u16, product_id: u16 },

    /// 设备存在，但没有任何接口提供 Bulk OUT 端点
    #[error("Device {vendor_id:04x}:{product_id:04x} has no bulk OUT endpoint")]
    NoBulkEndpoint { vendor_id: u16, product_id: u16 },

    /// 批量写入未发送任何字节
    #[error("Bulk write to endpoint 0x{endpoint:02x} transferred 0 of {expected} bytes")]
    ZeroLengthWrite { endpoint: u8, expected: usize },
}
