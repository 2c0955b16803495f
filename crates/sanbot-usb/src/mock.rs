//! Mock USB 后端（无硬件依赖）
//!
//! 内存中的设备列表 + 记录所有写入 + 可编排的失败，用于测试传输层。
//! `MockBackend` 是 `Clone` 的，测试代码保留一个副本用于检查事件。

use crate::backend::{BulkHandle, Enumerated, UsbBackend};
use crate::descriptor::{AltSettingInfo, EndpointInfo, EndpointSelection, InterfaceInfo, UsbDeviceInfo};
use crate::error::UsbError;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

/// 预设的单次写入结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockWrite {
    /// 写入全部字节
    Complete,
    /// 返回 0 字节
    Zero,
    /// 返回错误
    Fail(rusb::Error),
}

/// 后端事件（按发生顺序记录）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockEvent {
    Enumerate,
    Claim { product_id: u16, interface: u8 },
    Release { product_id: u16, interface: u8 },
    Write {
        product_id: u16,
        endpoint: u8,
        data: Vec<u8>,
        ok: bool,
    },
}

#[derive(Default)]
struct MockState {
    devices: Vec<UsbDeviceInfo>,
    fail_enumerate: bool,
    claim_failures: usize,
    scripted: HashMap<u16, VecDeque<MockWrite>>,
    write_delay: Duration,
    events: Vec<MockEvent>,
}

/// Mock USB 后端
#[derive(Clone, Default)]
pub struct MockBackend {
    state: Arc<Mutex<MockState>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// 模拟一块控制板：接口 0 只有中断端点，接口 1 提供 Bulk OUT 0x01 / IN 0x81
    pub fn board_info(vendor_id: u16, product_id: u16) -> UsbDeviceInfo {
        UsbDeviceInfo {
            vendor_id,
            product_id,
            bus_number: 1,
            address: (product_id & 0x7F) as u8,
            interfaces: vec![
                InterfaceInfo {
                    number: 0,
                    alt_settings: vec![AltSettingInfo {
                        setting: 0,
                        endpoints: vec![EndpointInfo {
                            address: 0x82,
                            transfer_type: rusb::TransferType::Interrupt,
                        }],
                    }],
                },
                InterfaceInfo {
                    number: 1,
                    alt_settings: vec![AltSettingInfo {
                        setting: 0,
                        endpoints: vec![EndpointInfo::bulk(0x01), EndpointInfo::bulk(0x81)],
                    }],
                },
            ],
        }
    }

    pub fn with_device(self, info: UsbDeviceInfo) -> Self {
        self.add_device(info);
        self
    }

    pub fn add_device(&self, info: UsbDeviceInfo) {
        self.state.lock().devices.push(info);
    }

    /// 模拟拔出：移除所有匹配 PID 的设备
    pub fn remove_device(&self, product_id: u16) {
        self.state.lock().devices.retain(|d| d.product_id != product_id);
    }

    pub fn set_fail_enumerate(&self, fail: bool) {
        self.state.lock().fail_enumerate = fail;
    }

    /// 接下来 `count` 次 claim 失败
    pub fn fail_next_claims(&self, count: usize) {
        self.state.lock().claim_failures = count;
    }

    /// 为某个 PID 预设写入结果，耗尽后恢复为 `Complete`
    pub fn script_writes(&self, product_id: u16, outcomes: impl IntoIterator<Item = MockWrite>) {
        self.state
            .lock()
            .scripted
            .entry(product_id)
            .or_default()
            .extend(outcomes);
    }

    /// 每次写入前休眠，用于观察排队行为
    pub fn set_write_delay(&self, delay: Duration) {
        self.state.lock().write_delay = delay;
    }

    pub fn events(&self) -> Vec<MockEvent> {
        self.state.lock().events.clone()
    }

    pub fn clear_events(&self) {
        self.state.lock().events.clear();
    }

    /// 某个 PID 收到的全部写入数据（含失败的尝试）
    pub fn writes_for(&self, product_id: u16) -> Vec<Vec<u8>> {
        self.state
            .lock()
            .events
            .iter()
            .filter_map(|e| match e {
                MockEvent::Write {
                    product_id: pid,
                    data,
                    ..
                } if *pid == product_id => Some(data.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn claim_count(&self, product_id: u16) -> usize {
        self.count(|e| matches!(e, MockEvent::Claim { product_id: pid, .. } if *pid == product_id))
    }

    pub fn release_count(&self, product_id: u16) -> usize {
        self.count(|e| matches!(e, MockEvent::Release { product_id: pid, .. } if *pid == product_id))
    }

    pub fn enumerate_count(&self) -> usize {
        self.count(|e| matches!(e, MockEvent::Enumerate))
    }

    fn count(&self, pred: impl Fn(&MockEvent) -> bool) -> usize {
        self.state.lock().events.iter().filter(|e| pred(e)).count()
    }
}

impl UsbBackend for MockBackend {
    type Device = UsbDeviceInfo;
    type Handle = MockHandle;

    fn enumerate(&self) -> Result<Vec<Enumerated<Self::Device>>, UsbError> {
        let mut state = self.state.lock();
        state.events.push(MockEvent::Enumerate);
        if state.fail_enumerate {
            return Err(UsbError::Usb(rusb::Error::Io));
        }
        Ok(state
            .devices
            .iter()
            .map(|info| Enumerated {
                info: info.clone(),
                device: info.clone(),
            })
            .collect())
    }

    fn claim(&self, device: &Self::Device, selection: &EndpointSelection) -> Result<Self::Handle, UsbError> {
        let mut state = self.state.lock();
        if state.claim_failures > 0 {
            state.claim_failures -= 1;
            return Err(UsbError::Usb(rusb::Error::Access));
        }
        state.events.push(MockEvent::Claim {
            product_id: device.product_id,
            interface: selection.interface_number,
        });
        Ok(MockHandle {
            state: Arc::clone(&self.state),
            product_id: device.product_id,
            interface: selection.interface_number,
            claimed: true,
        })
    }
}

/// Mock 设备句柄
pub struct MockHandle {
    state: Arc<Mutex<MockState>>,
    product_id: u16,
    interface: u8,
    claimed: bool,
}

impl BulkHandle for MockHandle {
    fn write_bulk(&mut self, endpoint: u8, data: &[u8], _timeout: Duration) -> Result<usize, UsbError> {
        let delay = self.state.lock().write_delay;
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }

        let mut state = self.state.lock();
        let outcome = state
            .scripted
            .get_mut(&self.product_id)
            .and_then(|q| q.pop_front())
            .unwrap_or(MockWrite::Complete);
        state.events.push(MockEvent::Write {
            product_id: self.product_id,
            endpoint,
            data: data.to_vec(),
            ok: outcome == MockWrite::Complete,
        });
        match outcome {
            MockWrite::Complete => Ok(data.len()),
            MockWrite::Zero => Ok(0),
            MockWrite::Fail(e) => Err(UsbError::Usb(e)),
        }
    }

    fn release(&mut self) {
        if self.claimed {
            self.claimed = false;
            self.state.lock().events.push(MockEvent::Release {
                product_id: self.product_id,
                interface: self.interface,
            });
        }
    }
}

impl Drop for MockHandle {
    fn drop(&mut self) {
        self.release();
    }
}
