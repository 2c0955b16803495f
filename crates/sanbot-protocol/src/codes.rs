//! 动作代码词表
//!
//! 每个词表是一个字符串 ↔ 字节的映射。解析时大小写不敏感，`_` 与 `-`
//! 等价；数字字面量（十进制或 `0x` 十六进制，0..=255）作为原始代码接受，
//! 未知代码保存在 `Raw` 中原样发送。

use crate::ProtocolError;
use std::fmt;
use std::str::FromStr;

/// 解析 0..=255 的数字字面量（十进制或 `0x` 十六进制）
pub fn parse_byte(token: &str, field: &'static str) -> Result<u8, ProtocolError> {
    let value = parse_number(token, field)?;
    u8::try_from(value).map_err(|_| ProtocolError::OutOfRange {
        field,
        value,
        max: u64::from(u8::MAX),
    })
}

/// 解析 0..=65535 的数字字面量（十进制或 `0x` 十六进制）
pub fn parse_word(token: &str, field: &'static str) -> Result<u16, ProtocolError> {
    let value = parse_number(token, field)?;
    u16::try_from(value).map_err(|_| ProtocolError::OutOfRange {
        field,
        value,
        max: u64::from(u16::MAX),
    })
}

fn parse_number(token: &str, field: &'static str) -> Result<u64, ProtocolError> {
    let trimmed = token.trim();
    let parsed = match trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => trimmed.parse::<u64>(),
    };
    parsed.map_err(|_| ProtocolError::InvalidNumber {
        field,
        token: token.to_string(),
    })
}

fn normalize(token: &str) -> String {
    token.trim().to_ascii_lowercase().replace('_', "-")
}

macro_rules! vocabulary {
    (
        $(#[$meta:meta])*
        $name:ident ($label:literal) {
            $(
                $(#[$vmeta:meta])*
                $variant:ident = $code:literal => [$($alias:literal),+ $(,)?]
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub enum $name {
            $(
                $(#[$vmeta])*
                $variant,
            )+
            /// 词表之外的原始代码
            Raw(u8),
        }

        impl $name {
            /// 词表中的全部已知取值
            pub const KNOWN: &'static [$name] = &[$($name::$variant),+];

            /// 线缆字节
            pub fn code(self) -> u8 {
                match self {
                    $($name::$variant => $code,)+
                    $name::Raw(code) => code,
                }
            }

            /// 首选名称（未知代码返回 `None`）
            pub fn name(self) -> Option<&'static str> {
                match self {
                    $($name::$variant => Some([$($alias),+][0]),)+
                    $name::Raw(_) => None,
                }
            }
        }

        impl From<u8> for $name {
            fn from(code: u8) -> Self {
                match code {
                    $($code => $name::$variant,)+
                    other => $name::Raw(other),
                }
            }
        }

        impl From<$name> for u8 {
            fn from(value: $name) -> u8 {
                value.code()
            }
        }

        impl FromStr for $name {
            type Err = ProtocolError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let token = normalize(s);
                $(
                    if [$($alias),+].contains(&token.as_str()) {
                        return Ok($name::$variant);
                    }
                )+
                match parse_number(&token, $label) {
                    Ok(value) => u8::try_from(value)
                        .map($name::from)
                        .map_err(|_| ProtocolError::OutOfRange {
                            field: $label,
                            value,
                            max: u64::from(u8::MAX),
                        }),
                    Err(_) => Err(ProtocolError::UnknownToken {
                        vocabulary: $label,
                        token: s.to_string(),
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self.name() {
                    Some(name) => f.write_str(name),
                    None => write!(f, "0x{:02X}", self.code()),
                }
            }
        }
    };
}

vocabulary! {
    /// 轮子运动方向
    WheelAction("wheel action") {
        Stop = 0x00 => ["stop"],
        Forward = 0x01 => ["forward"],
        Back = 0x02 => ["back", "backward"],
        Left = 0x03 => ["left"],
        Right = 0x04 => ["right"],
        LeftForward = 0x05 => ["left-forward"],
        RightForward = 0x06 => ["right-forward"],
        LeftBack = 0x07 => ["left-back"],
        RightBack = 0x08 => ["right-back"],
        LeftTranslation = 0x0A => ["left-translation"],
        RightTranslation = 0x0B => ["right-translation"],
        TurnLeft = 0x0C => ["turn-left"],
        TurnRight = 0x0D => ["turn-right"],
        StopTurn = 0xF0 => ["stop-turn"],
    }
}

vocabulary! {
    /// 手臂部位
    ArmPart("arm part") {
        Left = 0x01 => ["left"],
        Right = 0x02 => ["right"],
        Both = 0x03 => ["both"],
    }
}

vocabulary! {
    /// 手臂动作
    ArmAction("arm action") {
        Up = 0x01 => ["up"],
        Down = 0x02 => ["down"],
        Stop = 0x03 => ["stop"],
        Reset = 0x04 => ["reset"],
    }
}

vocabulary! {
    /// 头部动作
    HeadAction("head action") {
        Stop = 0x00 => ["stop"],
        Up = 0x01 => ["up"],
        Down = 0x02 => ["down"],
        Left = 0x03 => ["left"],
        Right = 0x04 => ["right"],
        LeftUp = 0x05 => ["left-up"],
        RightUp = 0x06 => ["right-up"],
        LeftDown = 0x07 => ["left-down"],
        RightDown = 0x08 => ["right-down"],
        VerticalReset = 0x09 => ["vertical-reset"],
        HorizontalReset = 0x0A => ["horizontal-reset"],
        CentreReset = 0x0B => ["centre-reset", "center-reset"],
    }
}

vocabulary! {
    /// 头部绝对角度的轴
    HeadAxis("head axis") {
        Vertical = 0x01 => ["vertical"],
        Horizontal = 0x02 => ["horizontal"],
    }
}

vocabulary! {
    /// 头部定位锁定模式
    HeadLock("head lock") {
        NoLock = 0x00 => ["no-lock"],
        HorizontalLock = 0x01 => ["horizontal-lock"],
        VerticalLock = 0x02 => ["vertical-lock"],
        BothLock = 0x03 => ["both-lock"],
    }
}

vocabulary! {
    /// 头部相对定位方向，水平和垂直两个轴共用同一组代码
    HeadDirection("head direction") {
        LeftOrUp = 0x01 => ["left", "up"],
        RightOrDown = 0x02 => ["right", "down"],
    }
}
