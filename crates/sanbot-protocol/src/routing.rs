//! 路由标签
//!
//! 路由标签是附加在线缆帧末尾的 1 个字节，决定发送给哪块控制板。
//! 它不计入 `content_len`，在真正发送前由传输层剥离。

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// 路由标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum RoutingTag {
    /// 头部控制板
    Head = 0x01,
    /// 底盘（身体）控制板
    Bottom = 0x02,
    /// 两块板都发送
    Both = 0x03,
}

impl RoutingTag {
    /// 是否需要发送到头部控制板
    pub fn targets_head(self) -> bool {
        matches!(self, RoutingTag::Head | RoutingTag::Both)
    }

    /// 是否需要发送到底盘控制板
    pub fn targets_bottom(self) -> bool {
        matches!(self, RoutingTag::Bottom | RoutingTag::Both)
    }

    /// 原始字节值
    pub fn code(self) -> u8 {
        self.into()
    }
}
