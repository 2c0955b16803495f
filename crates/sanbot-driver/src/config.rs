//! 传输管理器配置

use sanbot_protocol::{SANBOT_BOTTOM_PRODUCT_ID, SANBOT_HEAD_PRODUCT_ID, SANBOT_VENDOR_ID};
use std::time::Duration;

/// 默认重连阈值：每 10 次连续失败执行一次关闭-重开
pub const DEFAULT_RECONNECT_THRESHOLD: u32 = 10;

/// 传输管理器配置
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ManagerConfig {
    pub vendor_id: u16,
    pub head_product_id: u16,
    pub bottom_product_id: u16,
    /// 触发重连的连续失败次数（0 表示从不重连）
    pub reconnect_threshold: u32,
    /// 批量传输超时，`Duration::ZERO` 表示无限等待
    pub transfer_timeout: Duration,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            vendor_id: SANBOT_VENDOR_ID,
            head_product_id: SANBOT_HEAD_PRODUCT_ID,
            bottom_product_id: SANBOT_BOTTOM_PRODUCT_ID,
            reconnect_threshold: DEFAULT_RECONNECT_THRESHOLD,
            transfer_timeout: Duration::ZERO,
        }
    }
}
