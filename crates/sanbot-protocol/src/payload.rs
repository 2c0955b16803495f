//! 命令负载
//!
//! `CommandPayload` 由命令族字节和一串有序字段组成。字段为 `None` 表示
//! 该位置在线缆上省略，这样同一命令族的不同动作可以共用一种负载结构。

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// 命令族（`command_mode`）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum CommandMode {
    /// 轮子运动
    Wheel = 0x01,
    /// 头部运动
    Head = 0x02,
    /// 手臂运动
    Arm = 0x03,
}

/// 命令负载
///
/// 创建后立即被帧组装器消费，不会被修改。
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CommandPayload {
    /// 命令族字节（原始值，允许协议外的值）
    pub command_mode: u8,
    /// 有序字段，`None` 在组装时被丢弃
    pub fields: Vec<Option<u8>>,
}

impl CommandPayload {
    /// 创建空负载
    pub fn new(command_mode: impl Into<u8>) -> Self {
        Self {
            command_mode: command_mode.into(),
            fields: Vec::new(),
        }
    }

    /// 从已有字段创建负载
    pub fn with_fields(command_mode: impl Into<u8>, fields: Vec<Option<u8>>) -> Self {
        Self {
            command_mode: command_mode.into(),
            fields,
        }
    }

    /// 追加一个单字节字段
    pub fn byte(mut self, value: impl Into<u8>) -> Self {
        self.fields.push(Some(value.into()));
        self
    }

    /// 追加一个 16 位字段（低字节在前，高字节在后）
    pub fn word_le(mut self, value: u16) -> Self {
        let [lo, hi] = value.to_le_bytes();
        self.fields.push(Some(lo));
        self.fields.push(Some(hi));
        self
    }

    /// 追加一个省略位
    pub fn omitted(mut self) -> Self {
        self.fields.push(None);
        self
    }

    /// 过滤后的线缆字节数（含命令族字节）
    pub fn datas_len(&self) -> usize {
        1 + self.fields.iter().filter(|f| f.is_some()).count()
    }
}
