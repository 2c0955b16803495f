//! 帧组装与解析
//!
//! 线缆帧布局（多字节字段均为大端）：
//!
//! ```text
//! offset  size  field
//! 0       2     type               = 0xA403
//! 2       2     subtype            = 0x0000
//! 4       4     content_len        = len(datas) + 6
//! 8       1     ack_flg
//! 9       7     reserved           = 0x00 × 7
//! 16      2     frame_head         = 0xFFA5
//! 18      1     ack_flg            (重复)
//! 19      2     mmnn               = len(datas) + 1
//! 21      N     datas
//! 21+N    1     checksum
//! [+1]    1     routing_tag        (不计入 content_len)
//! ```
//!
//! 校验和 = (0xFF + 0xA5 + ack_flg + mmnn + Σdatas) & 0xFF，其中 `mmnn`
//! 以完整的 16 位数值参与累加，而不是拆成两个字节。这是固件的实际行为，
//! 必须逐位保持一致。

use crate::constants::*;
use crate::payload::CommandPayload;
use crate::routing::RoutingTag;
use crate::ProtocolError;
use bytes::{Buf, BufMut, Bytes, BytesMut};

/// 每次调用可变的帧参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FrameParams {
    pub ack_flg: u8,
}

impl Default for FrameParams {
    fn default() -> Self {
        Self {
            ack_flg: DEFAULT_ACK_FLAG,
        }
    }
}

impl FrameParams {
    pub fn new(ack_flg: u8) -> Self {
        Self { ack_flg }
    }
}

/// 由负载派生的帧字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComputedFields {
    pub content_len: u32,
    pub mmnn: u16,
    pub checksum: u8,
}

/// 过滤负载：`[command_mode] ++ fields`，丢弃所有省略位
pub fn build_datas(payload: &CommandPayload) -> Vec<u8> {
    let mut datas = Vec::with_capacity(1 + payload.fields.len());
    datas.push(payload.command_mode);
    datas.extend(payload.fields.iter().flatten().copied());
    datas
}

/// 计算长度字段和校验和
pub fn compute_fields(datas: &[u8], params: &FrameParams) -> ComputedFields {
    let content_len = (datas.len() + CONTENT_LEN_OVERHEAD) as u32;
    let mmnn = (datas.len() + MMNN_OVERHEAD) as u16;
    ComputedFields {
        content_len,
        mmnn,
        checksum: checksum(datas, params.ack_flg, mmnn),
    }
}

fn checksum(datas: &[u8], ack_flg: u8, mmnn: u16) -> u8 {
    let [head_hi, head_lo] = FRAME_HEAD.to_be_bytes();
    let mut sum = u32::from(head_hi) + u32::from(head_lo) + u32::from(ack_flg) + u32::from(mmnn);
    for &b in datas {
        sum = sum.wrapping_add(u32::from(b));
    }
    (sum & 0xFF) as u8
}

/// 帧总长度（不含路由标签）
pub const fn frame_len(datas_len: usize) -> usize {
    HEADER_LEN + datas_len + CHECKSUM_LEN
}

fn write_frame(buf: &mut BytesMut, datas: &[u8], params: &FrameParams) {
    let fields = compute_fields(datas, params);
    buf.put_u16(FRAME_TYPE);
    buf.put_u16(FRAME_SUBTYPE);
    buf.put_u32(fields.content_len);
    buf.put_u8(params.ack_flg);
    buf.put_bytes(0, RESERVED_LEN);
    buf.put_u16(FRAME_HEAD);
    buf.put_u8(params.ack_flg);
    buf.put_u16(fields.mmnn);
    buf.put_slice(datas);
    buf.put_u8(fields.checksum);
}

/// 把负载组装成线缆帧（不含路由标签）
pub fn build_frame(payload: &CommandPayload, params: &FrameParams) -> Bytes {
    let datas = build_datas(payload);
    let mut buf = BytesMut::with_capacity(frame_len(datas.len()));
    write_frame(&mut buf, &datas, params);
    buf.freeze()
}

/// 在帧末尾追加路由标签
pub fn append_routing_tag(frame: &[u8], tag: RoutingTag) -> Bytes {
    let mut buf = BytesMut::with_capacity(frame.len() + 1);
    buf.put_slice(frame);
    buf.put_u8(tag.code());
    buf.freeze()
}

/// 使用给定的 `ack_flg` 组装线缆帧
pub fn assemble_frame(payload: &CommandPayload, ack_flg: u8) -> Bytes {
    build_frame(payload, &FrameParams::new(ack_flg))
}

/// 组装帧并附加路由标签，一次分配完成
pub fn assemble_routed(payload: &CommandPayload, params: &FrameParams, tag: RoutingTag) -> Bytes {
    let datas = build_datas(payload);
    let mut buf = BytesMut::with_capacity(frame_len(datas.len()) + 1);
    write_frame(&mut buf, &datas, params);
    buf.put_u8(tag.code());
    buf.freeze()
}

/// 拆分带路由标签的缓冲区，返回 `(tag, frame)`
///
/// 帧部分至少需要 1 个字节，否则返回 `None`。标签值本身不做校验。
pub fn split_routing_tag(routed: &[u8]) -> Option<(u8, &[u8])> {
    match routed.split_last() {
        Some((&tag, frame)) if !frame.is_empty() => Some((tag, frame)),
        _ => None,
    }
}

/// 解析后的线缆帧
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFrame {
    pub ack_flg: u8,
    pub content_len: u32,
    pub mmnn: u16,
    pub datas: Bytes,
    pub checksum: u8,
}

impl ParsedFrame {
    /// 命令族字节
    pub fn command_mode(&self) -> Option<u8> {
        self.datas.first().copied()
    }

    /// 子模式字节
    pub fn sub_mode(&self) -> Option<u8> {
        self.datas.get(1).copied()
    }
}

/// 解析线缆帧（不含路由标签）
///
/// 校验 type / subtype / 保留字节 / frame_head / 重复的 ack_flg /
/// content_len / mmnn / checksum。
pub fn parse_frame(frame: &[u8]) -> Result<ParsedFrame, ProtocolError> {
    let min_len = frame_len(0);
    if frame.len() < min_len {
        return Err(ProtocolError::FrameTooShort {
            expected: min_len,
            actual: frame.len(),
        });
    }

    let mut buf = frame;
    let frame_type = buf.get_u16();
    if frame_type != FRAME_TYPE {
        return Err(ProtocolError::InvalidField {
            field: "type",
            value: u32::from(frame_type),
        });
    }
    let subtype = buf.get_u16();
    if subtype != FRAME_SUBTYPE {
        return Err(ProtocolError::InvalidField {
            field: "subtype",
            value: u32::from(subtype),
        });
    }
    let content_len = buf.get_u32();
    let ack_flg = buf.get_u8();
    for _ in 0..RESERVED_LEN {
        let b = buf.get_u8();
        if b != 0 {
            return Err(ProtocolError::InvalidField {
                field: "reserved",
                value: u32::from(b),
            });
        }
    }
    let frame_head = buf.get_u16();
    if frame_head != FRAME_HEAD {
        return Err(ProtocolError::InvalidField {
            field: "frame_head",
            value: u32::from(frame_head),
        });
    }
    let ack_repeat = buf.get_u8();
    if ack_repeat != ack_flg {
        return Err(ProtocolError::InvalidField {
            field: "ack_flg",
            value: u32::from(ack_repeat),
        });
    }
    let mmnn = buf.get_u16();

    // 剩余: datas + checksum
    let datas_len = buf.len() - CHECKSUM_LEN;
    if content_len as usize != datas_len + CONTENT_LEN_OVERHEAD {
        return Err(ProtocolError::LengthMismatch {
            field: "content_len",
            declared: content_len as usize,
            actual: datas_len + CONTENT_LEN_OVERHEAD,
        });
    }
    if mmnn as usize != datas_len + MMNN_OVERHEAD {
        return Err(ProtocolError::LengthMismatch {
            field: "mmnn",
            declared: mmnn as usize,
            actual: datas_len + MMNN_OVERHEAD,
        });
    }

    let datas = Bytes::copy_from_slice(&buf[..datas_len]);
    let actual = buf[datas_len];
    let expected = checksum(&datas, ack_flg, mmnn);
    if actual != expected {
        return Err(ProtocolError::ChecksumMismatch { expected, actual });
    }

    Ok(ParsedFrame {
        ack_flg,
        content_len,
        mmnn,
        datas,
        checksum: actual,
    })
}
