//! # Sanbot Protocol
//!
//! Sanbot 头部 / 底盘 MCU 的 USB 帧协议定义（无硬件依赖）
//!
//! ## 模块
//!
//! - `constants`: 帧头、类型、USB 标识等协议常量
//! - `payload`: 命令负载（`CommandPayload`）与命令族
//! - `frame`: 帧组装（长度计算、校验和、路由标签）与帧解析
//! - `routing`: 路由标签（头部 / 底盘 / 广播）
//! - `codes`: 动作代码词表（字符串 ↔ 字节）
//! - `catalogue`: 命令目录，把语义动作映射为带路由标签的线缆字节
//!
//! ## 数据流
//!
//! ```text
//! RobotCommand (catalogue)
//!     ↓ payload()
//! CommandPayload { command_mode, fields: [Option<u8>] }
//!     ↓ build_datas() / build_frame()
//! Wire frame (21 字节头 + datas + checksum)
//!     ↓ append_routing_tag()
//! Routed buffer → sanbot-driver 发送队列
//! ```
//!
//! ## 字节序
//!
//! 帧头中的多字节字段使用大端字节序；命令负载中的 16 位字段由目录层
//! 拆分为“低字节在前、高字节在后”的两个独立字节。

pub mod catalogue;
pub mod codes;
pub mod constants;
pub mod frame;
pub mod payload;
pub mod routing;

// 重新导出常用类型
pub use catalogue::*;
pub use codes::*;
pub use constants::*;
pub use frame::{
    ComputedFields, FrameParams, ParsedFrame, append_routing_tag, assemble_frame,
    assemble_routed, build_datas, build_frame, compute_fields, frame_len, parse_frame,
    split_routing_tag,
};
pub use payload::{CommandMode, CommandPayload};
pub use routing::RoutingTag;

use thiserror::Error;

/// 协议错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Unknown {vocabulary} token: {token:?}")]
    UnknownToken {
        vocabulary: &'static str,
        token: String,
    },

    #[error("Invalid number for {field}: {token:?}")]
    InvalidNumber { field: &'static str, token: String },

    #[error("Value {value} out of range for {field} (max {max})")]
    OutOfRange {
        field: &'static str,
        value: u64,
        max: u64,
    },

    #[error("Frame too short: expected at least {expected} bytes, got {actual}")]
    FrameTooShort { expected: usize, actual: usize },

    #[error("Invalid value for field {field}: 0x{value:X}")]
    InvalidField { field: &'static str, value: u32 },

    #[error("Length mismatch in {field}: declared {declared}, actual {actual}")]
    LengthMismatch {
        field: &'static str,
        declared: usize,
        actual: usize,
    },

    #[error("Checksum mismatch: expected 0x{expected:02X}, got 0x{actual:02X}")]
    ChecksumMismatch { expected: u8, actual: u8 },
}

/// 把字节序列格式化为空格分隔的大写十六进制（`FF A5 01`）
///
/// 用于调试输出和命令日志。
pub fn to_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 3);
    for (i, b) in bytes.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(&format!("{:02X}", b));
    }
    out
}
