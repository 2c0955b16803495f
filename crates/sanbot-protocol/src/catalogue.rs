//! 命令目录
//!
//! 把语义动作（轮子 / 手臂 / 头部）映射为 `CommandPayload` 和路由标签。
//! 每个 `build_*` 函数都是纯函数，返回可直接交给传输层的带标签缓冲区
//! （帧 + 路由标签，`ack_flg = 0x01`）。
//!
//! 16 位参数由目录层拆分为低字节、高字节两个字段；超出字段宽度的数值
//! 由参数类型（`u8` / `u16`）截断，范围校验由调用方负责。

use crate::codes::*;
use crate::frame::{FrameParams, assemble_routed};
use crate::payload::{CommandMode, CommandPayload};
use crate::routing::RoutingTag;
use bytes::Bytes;

/// 各命令族的子模式字节（负载中紧跟命令族字节的第一个字段）
pub mod sub_mode {
    pub const WHEEL_NO_ANGLE: u8 = 0x01;
    pub const WHEEL_RELATIVE_ANGLE: u8 = 0x02;
    pub const WHEEL_TIMED: u8 = 0x10;
    pub const WHEEL_DISTANCE: u8 = 0x11;

    pub const ARM_NO_ANGLE: u8 = 0x01;
    pub const ARM_RELATIVE_ANGLE: u8 = 0x02;
    pub const ARM_ABSOLUTE_ANGLE: u8 = 0x03;

    pub const HEAD_NO_ANGLE: u8 = 0x01;
    pub const HEAD_RELATIVE_ANGLE: u8 = 0x02;
    pub const HEAD_ABSOLUTE_ANGLE: u8 = 0x03;
    pub const HEAD_CENTRE_LOCK: u8 = 0x20;
    pub const HEAD_LOCATE_ABSOLUTE: u8 = 0x21;
    pub const HEAD_LOCATE_RELATIVE: u8 = 0x22;
}

/// 手臂绝对角度命令固定写入的方向字节
pub const ARM_ABSOLUTE_DIRECTION: u8 = 0x02;
/// 头部相对 / 绝对角度命令固定写入的速度字节
pub const HEAD_ANGLE_SPEED: u8 = 0x00;
/// 头部回中命令的动作字节
pub const HEAD_CENTRE_ACTION: u8 = 0x01;

/// 一条语义机器人命令
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RobotCommand {
    WheelNoAngle {
        action: WheelAction,
        speed: u8,
        duration: u16,
        duration_mode: u8,
    },
    WheelRelative {
        action: WheelAction,
        speed: u8,
        angle: u16,
    },
    WheelTimed {
        action: WheelAction,
        time: u16,
        degree: u8,
    },
    WheelDistance {
        action: WheelAction,
        speed: u8,
        distance: u16,
    },
    ArmNoAngle {
        part: ArmPart,
        speed: u8,
        action: ArmAction,
    },
    ArmRelative {
        part: ArmPart,
        speed: u8,
        action: ArmAction,
        angle: u16,
    },
    ArmAbsolute {
        part: ArmPart,
        speed: u8,
        angle: u16,
    },
    HeadNoAngle {
        action: HeadAction,
        speed: u8,
    },
    HeadRelative {
        action: HeadAction,
        angle: u16,
    },
    HeadAbsolute {
        axis: HeadAxis,
        angle: u16,
    },
    HeadCentre,
    HeadLocateAbsolute {
        lock: HeadLock,
        horizontal: u16,
        vertical: u16,
    },
    HeadLocateRelative {
        lock: HeadLock,
        horizontal_direction: HeadDirection,
        horizontal_angle: u8,
        vertical_direction: HeadDirection,
        vertical_angle: u8,
    },
}

impl RobotCommand {
    /// 命令名称（与 CLI 子命令一致）
    pub fn name(&self) -> &'static str {
        match self {
            RobotCommand::WheelNoAngle { .. } => "wheel-no-angle",
            RobotCommand::WheelRelative { .. } => "wheel-relative",
            RobotCommand::WheelTimed { .. } => "wheel-timed",
            RobotCommand::WheelDistance { .. } => "wheel-distance",
            RobotCommand::ArmNoAngle { .. } => "arm-no-angle",
            RobotCommand::ArmRelative { .. } => "arm-relative",
            RobotCommand::ArmAbsolute { .. } => "arm-absolute",
            RobotCommand::HeadNoAngle { .. } => "head-no-angle",
            RobotCommand::HeadRelative { .. } => "head-relative",
            RobotCommand::HeadAbsolute { .. } => "head-absolute",
            RobotCommand::HeadCentre => "head-centre",
            RobotCommand::HeadLocateAbsolute { .. } => "head-locate-absolute",
            RobotCommand::HeadLocateRelative { .. } => "head-locate-relative",
        }
    }

    pub fn command_mode(&self) -> CommandMode {
        match self {
            RobotCommand::WheelNoAngle { .. }
            | RobotCommand::WheelRelative { .. }
            | RobotCommand::WheelTimed { .. }
            | RobotCommand::WheelDistance { .. } => CommandMode::Wheel,
            RobotCommand::ArmNoAngle { .. }
            | RobotCommand::ArmRelative { .. }
            | RobotCommand::ArmAbsolute { .. } => CommandMode::Arm,
            _ => CommandMode::Head,
        }
    }

    pub fn sub_mode(&self) -> u8 {
        match self {
            RobotCommand::WheelNoAngle { .. } => sub_mode::WHEEL_NO_ANGLE,
            RobotCommand::WheelRelative { .. } => sub_mode::WHEEL_RELATIVE_ANGLE,
            RobotCommand::WheelTimed { .. } => sub_mode::WHEEL_TIMED,
            RobotCommand::WheelDistance { .. } => sub_mode::WHEEL_DISTANCE,
            RobotCommand::ArmNoAngle { .. } => sub_mode::ARM_NO_ANGLE,
            RobotCommand::ArmRelative { .. } => sub_mode::ARM_RELATIVE_ANGLE,
            RobotCommand::ArmAbsolute { .. } => sub_mode::ARM_ABSOLUTE_ANGLE,
            RobotCommand::HeadNoAngle { .. } => sub_mode::HEAD_NO_ANGLE,
            RobotCommand::HeadRelative { .. } => sub_mode::HEAD_RELATIVE_ANGLE,
            RobotCommand::HeadAbsolute { .. } => sub_mode::HEAD_ABSOLUTE_ANGLE,
            RobotCommand::HeadCentre => sub_mode::HEAD_CENTRE_LOCK,
            RobotCommand::HeadLocateAbsolute { .. } => sub_mode::HEAD_LOCATE_ABSOLUTE,
            RobotCommand::HeadLocateRelative { .. } => sub_mode::HEAD_LOCATE_RELATIVE,
        }
    }

    /// 轮子和手臂由底盘板执行，头部由头部板执行
    pub fn routing_tag(&self) -> RoutingTag {
        match self.command_mode() {
            CommandMode::Wheel | CommandMode::Arm => RoutingTag::Bottom,
            CommandMode::Head => RoutingTag::Head,
        }
    }

    /// 构建命令负载
    pub fn payload(&self) -> CommandPayload {
        let p = CommandPayload::new(self.command_mode()).byte(self.sub_mode());
        match *self {
            RobotCommand::WheelNoAngle {
                action,
                speed,
                duration,
                duration_mode,
            } => p.byte(action).byte(speed).word_le(duration).byte(duration_mode),
            RobotCommand::WheelRelative {
                action,
                speed,
                angle,
            } => p.byte(action).byte(speed).word_le(angle),
            RobotCommand::WheelTimed {
                action,
                time,
                degree,
            } => p.byte(action).word_le(time).byte(degree),
            RobotCommand::WheelDistance {
                action,
                speed,
                distance,
            } => p.byte(action).byte(speed).word_le(distance),
            RobotCommand::ArmNoAngle {
                part,
                speed,
                action,
            } => p.byte(part).byte(speed).byte(action),
            RobotCommand::ArmRelative {
                part,
                speed,
                action,
                angle,
            } => p.byte(part).byte(speed).byte(action).word_le(angle),
            RobotCommand::ArmAbsolute { part, speed, angle } => p
                .byte(part)
                .byte(speed)
                .byte(ARM_ABSOLUTE_DIRECTION)
                .word_le(angle),
            RobotCommand::HeadNoAngle { action, speed } => p.byte(action).byte(speed),
            RobotCommand::HeadRelative { action, angle } => {
                p.byte(action).byte(HEAD_ANGLE_SPEED).word_le(angle)
            },
            RobotCommand::HeadAbsolute { axis, angle } => {
                p.byte(axis).byte(HEAD_ANGLE_SPEED).word_le(angle)
            },
            RobotCommand::HeadCentre => p.byte(HEAD_CENTRE_ACTION),
            RobotCommand::HeadLocateAbsolute {
                lock,
                horizontal,
                vertical,
            } => p.byte(lock).word_le(horizontal).word_le(vertical),
            RobotCommand::HeadLocateRelative {
                lock,
                horizontal_direction,
                horizontal_angle,
                vertical_direction,
                vertical_angle,
            } => p
                .byte(lock)
                .byte(horizontal_direction)
                .byte(horizontal_angle)
                .byte(vertical_direction)
                .byte(vertical_angle),
        }
    }

    /// 组装带路由标签的缓冲区
    pub fn assemble(&self, params: &FrameParams) -> Bytes {
        assemble_routed(&self.payload(), params, self.routing_tag())
    }

    /// 使用默认帧参数组装带路由标签的缓冲区
    pub fn to_routed(&self) -> Bytes {
        self.assemble(&FrameParams::default())
    }
}

// ============================================================================
// 逐动作入口
// ============================================================================

pub fn build_wheel_no_angle(action: WheelAction, speed: u8, duration: u16, duration_mode: u8) -> Bytes {
    RobotCommand::WheelNoAngle {
        action,
        speed,
        duration,
        duration_mode,
    }
    .to_routed()
}

pub fn build_wheel_relative_angle(action: WheelAction, speed: u8, angle: u16) -> Bytes {
    RobotCommand::WheelRelative {
        action,
        speed,
        angle,
    }
    .to_routed()
}

pub fn build_wheel_timed(action: WheelAction, time: u16, degree: u8) -> Bytes {
    RobotCommand::WheelTimed {
        action,
        time,
        degree,
    }
    .to_routed()
}

pub fn build_wheel_distance(action: WheelAction, speed: u8, distance: u16) -> Bytes {
    RobotCommand::WheelDistance {
        action,
        speed,
        distance,
    }
    .to_routed()
}

pub fn build_arm_no_angle(part: ArmPart, speed: u8, action: ArmAction) -> Bytes {
    RobotCommand::ArmNoAngle {
        part,
        speed,
        action,
    }
    .to_routed()
}

pub fn build_arm_relative_angle(part: ArmPart, speed: u8, action: ArmAction, angle: u16) -> Bytes {
    RobotCommand::ArmRelative {
        part,
        speed,
        action,
        angle,
    }
    .to_routed()
}

pub fn build_arm_absolute_angle(part: ArmPart, speed: u8, angle: u16) -> Bytes {
    RobotCommand::ArmAbsolute { part, speed, angle }.to_routed()
}

pub fn build_head_no_angle(action: HeadAction, speed: u8) -> Bytes {
    RobotCommand::HeadNoAngle { action, speed }.to_routed()
}

pub fn build_head_relative_angle(action: HeadAction, angle: u16) -> Bytes {
    RobotCommand::HeadRelative { action, angle }.to_routed()
}

pub fn build_head_absolute_angle(axis: HeadAxis, angle: u16) -> Bytes {
    RobotCommand::HeadAbsolute { axis, angle }.to_routed()
}

pub fn build_head_centre_lock() -> Bytes {
    RobotCommand::HeadCentre.to_routed()
}

pub fn build_head_locate_absolute(lock: HeadLock, horizontal: u16, vertical: u16) -> Bytes {
    RobotCommand::HeadLocateAbsolute {
        lock,
        horizontal,
        vertical,
    }
    .to_routed()
}

pub fn build_head_locate_relative(
    lock: HeadLock,
    horizontal_direction: HeadDirection,
    horizontal_angle: u8,
    vertical_direction: HeadDirection,
    vertical_angle: u8,
) -> Bytes {
    RobotCommand::HeadLocateRelative {
        lock,
        horizontal_direction,
        horizontal_angle,
        vertical_direction,
        vertical_angle,
    }
    .to_routed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::build_datas;

    fn datas(cmd: RobotCommand) -> Vec<u8> {
        build_datas(&cmd.payload())
    }

    #[test]
    fn test_wheel_distance_forward() {
        let routed = build_wheel_distance(WheelAction::Forward, 50, 1000);
        assert_eq!(&routed[21..27], &[0x01, 0x11, 0x01, 0x32, 0xE8, 0x03]);
        assert_eq!(&routed[4..8], &[0, 0, 0, 12]);
        assert_eq!(&routed[19..21], &[0, 7]);
        assert_eq!(routed.len(), 21 + 6 + 1 + 1);
        assert_eq!(routed[routed.len() - 1], 0x02);
    }

    #[test]
    fn test_head_centre() {
        let routed = build_head_centre_lock();
        assert_eq!(&routed[21..24], &[0x02, 0x20, 0x01]);
        assert_eq!(&routed[4..8], &[0, 0, 0, 9]);
        assert_eq!(&routed[19..21], &[0, 4]);
        assert_eq!(routed[routed.len() - 1], 0x01);
    }

    #[test]
    fn test_field_orders() {
        assert_eq!(
            datas(RobotCommand::WheelNoAngle {
                action: WheelAction::TurnLeft,
                speed: 10,
                duration: 0x0102,
                duration_mode: 0x01,
            }),
            vec![0x01, 0x01, 0x0C, 10, 0x02, 0x01, 0x01]
        );
        assert_eq!(
            datas(RobotCommand::WheelTimed {
                action: WheelAction::Back,
                time: 500,
                degree: 30,
            }),
            vec![0x01, 0x10, 0x02, 0xF4, 0x01, 30]
        );
        assert_eq!(
            datas(RobotCommand::ArmAbsolute {
                part: ArmPart::Left,
                speed: 5,
                angle: 90,
            }),
            vec![0x03, 0x03, 0x01, 5, 0x02, 90, 0]
        );
        assert_eq!(
            datas(RobotCommand::ArmRelative {
                part: ArmPart::Both,
                speed: 5,
                action: ArmAction::Up,
                angle: 5,
            }),
            vec![0x03, 0x02, 0x03, 5, 0x01, 5, 0]
        );
        assert_eq!(
            datas(RobotCommand::HeadRelative {
                action: HeadAction::Left,
                angle: 300,
            }),
            vec![0x02, 0x02, 0x03, 0x00, 0x2C, 0x01]
        );
        assert_eq!(
            datas(RobotCommand::HeadAbsolute {
                axis: HeadAxis::Horizontal,
                angle: 90,
            }),
            vec![0x02, 0x03, 0x02, 0x00, 90, 0]
        );
        assert_eq!(
            datas(RobotCommand::HeadLocateRelative {
                lock: HeadLock::BothLock,
                horizontal_direction: HeadDirection::LeftOrUp,
                horizontal_angle: 20,
                vertical_direction: HeadDirection::RightOrDown,
                vertical_angle: 10,
            }),
            vec![0x02, 0x22, 0x03, 0x01, 20, 0x02, 10]
        );
        assert_eq!(
            datas(RobotCommand::HeadLocateAbsolute {
                lock: HeadLock::NoLock,
                horizontal: 0x0203,
                vertical: 0x0405,
            }),
            vec![0x02, 0x21, 0x00, 0x03, 0x02, 0x05, 0x04]
        );
    }

    #[test]
    fn test_routing_tags() {
        assert_eq!(RobotCommand::HeadCentre.routing_tag(), RoutingTag::Head);
        let arm = RobotCommand::ArmNoAngle {
            part: ArmPart::Right,
            speed: 1,
            action: ArmAction::Reset,
        };
        assert_eq!(arm.routing_tag(), RoutingTag::Bottom);
        assert_eq!(arm.name(), "arm-no-angle");
    }

    #[test]
    fn test_raw_codes_pass_through() {
        let cmd = RobotCommand::HeadNoAngle {
            action: HeadAction::Raw(0xFF),
            speed: 0xFF,
        };
        assert_eq!(datas(cmd), vec![0x02, 0x01, 0xFF, 0xFF]);
    }
}
