//! 协议常量定义
//!
//! 集中定义帧格式和 USB 设备相关的常量，避免在代码中散落"魔法数"。

// ============================================================================
// Frame Constants
// ============================================================================

/// 帧类型（`type` 字段，偏移 0）
pub const FRAME_TYPE: u16 = 0xA403;
/// 帧子类型（`subtype` 字段，偏移 2）
pub const FRAME_SUBTYPE: u16 = 0x0000;
/// 帧头标记（`frame_head` 字段，偏移 16）
pub const FRAME_HEAD: u16 = 0xFFA5;
/// 默认应答标志（实际观测值）
pub const DEFAULT_ACK_FLAG: u8 = 0x01;

/// 保留字节数（偏移 9..16，全部为 0）
pub const RESERVED_LEN: usize = 7;

/// 实际帧头长度：type(2) + subtype(2) + content_len(4) + ack(1) + reserved(7)
/// + frame_head(2) + ack(1) + mmnn(2)
pub const HEADER_LEN: usize = 21;

/// 校验和长度
pub const CHECKSUM_LEN: usize = 1;

/// 声明的消息头长度
///
/// 协议文档中声明为 0x10，但与实际帧头长度（21 字节）不一致。
/// 只保留作参考，帧布局从不依赖此值。
pub const DECLARED_HEADER_LEN: usize = 0x10;

/// `content_len` = `datas` 长度 + 该值（frame_head 2 + ack 1 + mmnn 2 + checksum 1）
pub const CONTENT_LEN_OVERHEAD: usize = 6;

/// `mmnn` = `datas` 长度 + 该值
pub const MMNN_OVERHEAD: usize = 1;

// ============================================================================
// USB Identifiers
// ============================================================================

/// 两块控制板共用的 USB Vendor ID
pub const SANBOT_VENDOR_ID: u16 = 0x0483;
/// 底盘（身体）控制板 Product ID
pub const SANBOT_BOTTOM_PRODUCT_ID: u16 = 0x5740;
/// 头部控制板 Product ID
pub const SANBOT_HEAD_PRODUCT_ID: u16 = 0x5741;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_len_matches_layout() {
        // 2 + 2 + 4 + 1 + 7 + 2 + 1 + 2
        assert_eq!(HEADER_LEN, 2 + 2 + 4 + 1 + RESERVED_LEN + 2 + 1 + 2);
        assert_ne!(HEADER_LEN, DECLARED_HEADER_LEN);
    }

    #[test]
    fn test_usb_identifiers() {
        assert_eq!(SANBOT_VENDOR_ID, 0x0483);
        assert_ne!(SANBOT_HEAD_PRODUCT_ID, SANBOT_BOTTOM_PRODUCT_ID);
    }
}
