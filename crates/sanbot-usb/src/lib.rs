//! # Sanbot USB
//!
//! 控制板 USB 设备层：枚举、Bulk 端点解析、接口 claim 与批量写入。
//!
//! - `descriptor`: 描述符快照和纯函数端点解析（`find_bulk_endpoint`）
//! - `backend`: `UsbBackend` / `BulkHandle` 抽象和 `open_bulk_endpoint`
//! - `rusb_backend`: 基于 libusb 的真实后端
//! - `mock`: 内存后端（`mock` feature 或测试时启用）

pub mod backend;
pub mod descriptor;
pub mod error;
pub mod rusb_backend;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use backend::{BulkHandle, Enumerated, OpenedEndpoint, UsbBackend, open_bulk_endpoint};
pub use descriptor::{
    AltSettingInfo, EndpointInfo, EndpointSelection, InterfaceInfo, UsbDeviceInfo,
    find_bulk_endpoint, find_bulk_endpoints,
};
pub use error::UsbError;
pub use rusb_backend::{RusbBackend, RusbHandle};

#[cfg(any(test, feature = "mock"))]
pub use mock::{MockBackend, MockEvent, MockHandle, MockWrite};

pub use rusb;
pub use rusb::TransferType;
