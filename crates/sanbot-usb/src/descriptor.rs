//! 设备描述符快照与 Bulk 端点解析
//!
//! 枚举得到的设备先被拍成纯数据快照（`UsbDeviceInfo`），端点选择只依赖
//! 快照，因此可以用伪造的设备列表测试，而不需要真实硬件。

use rusb::TransferType;

/// 端点方向位（`bEndpointAddress` 的 bit 7）
pub const ENDPOINT_DIR_IN: u8 = 0x80;

/// 端点描述符快照
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointInfo {
    pub address: u8,
    pub transfer_type: TransferType,
}

impl EndpointInfo {
    pub fn bulk(address: u8) -> Self {
        Self {
            address,
            transfer_type: TransferType::Bulk,
        }
    }

    pub fn is_in(&self) -> bool {
        self.address & ENDPOINT_DIR_IN != 0
    }

    pub fn is_bulk(&self) -> bool {
        self.transfer_type == TransferType::Bulk
    }
}

/// 接口备用设置快照
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AltSettingInfo {
    pub setting: u8,
    pub endpoints: Vec<EndpointInfo>,
}

/// 接口快照
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceInfo {
    pub number: u8,
    pub alt_settings: Vec<AltSettingInfo>,
}

/// 设备快照
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsbDeviceInfo {
    pub vendor_id: u16,
    pub product_id: u16,
    pub bus_number: u8,
    pub address: u8,
    pub interfaces: Vec<InterfaceInfo>,
}

impl UsbDeviceInfo {
    pub fn matches(&self, vendor_id: u16, product_id: u16) -> bool {
        self.vendor_id == vendor_id && self.product_id == product_id
    }
}

/// 解析结果：要 claim 的接口和端点地址
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointSelection {
    /// 在设备列表中的下标
    pub device_index: usize,
    pub interface_number: u8,
    pub alt_setting: u8,
    pub out_endpoint: u8,
    /// 同一备用设置下的 Bulk IN 端点（可能不存在）
    pub in_endpoint: Option<u8>,
}

/// 在一个设备中查找第一个提供 Bulk OUT 端点的接口 / 备用设置
///
/// 接口和备用设置按描述符顺序遍历；同一备用设置下的第一个 Bulk IN 端点
/// 被一并记录。
pub fn select_interface(device: &UsbDeviceInfo) -> Option<(u8, u8, u8, Option<u8>)> {
    for interface in &device.interfaces {
        for alt in &interface.alt_settings {
            let mut out_endpoint = None;
            let mut in_endpoint = None;
            for ep in alt.endpoints.iter().filter(|ep| ep.is_bulk()) {
                if ep.is_in() {
                    in_endpoint.get_or_insert(ep.address);
                } else {
                    out_endpoint.get_or_insert(ep.address);
                }
            }
            if let Some(out) = out_endpoint {
                return Some((interface.number, alt.setting, out, in_endpoint));
            }
        }
    }
    None
}

/// 列出所有匹配 VID/PID 且具备 Bulk OUT 端点的候选，保持枚举顺序
pub fn find_bulk_endpoints<'a, I>(devices: I, vendor_id: u16, product_id: u16) -> Vec<EndpointSelection>
where
    I: IntoIterator<Item = &'a UsbDeviceInfo>,
{
    devices
        .into_iter()
        .enumerate()
        .filter(|(_, dev)| dev.matches(vendor_id, product_id))
        .filter_map(|(index, dev)| {
            select_interface(dev).map(|(interface_number, alt_setting, out_endpoint, in_endpoint)| {
                EndpointSelection {
                    device_index: index,
                    interface_number,
                    alt_setting,
                    out_endpoint,
                    in_endpoint,
                }
            })
        })
        .collect()
}

/// 第一个匹配 VID/PID 且具备 Bulk OUT 端点的候选
pub fn find_bulk_endpoint<'a, I>(devices: I, vendor_id: u16, product_id: u16) -> Option<EndpointSelection>
where
    I: IntoIterator<Item = &'a UsbDeviceInfo>,
{
    find_bulk_endpoints(devices, vendor_id, product_id).into_iter().next()
}
