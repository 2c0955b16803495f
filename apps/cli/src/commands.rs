//! 动作子命令
//!
//! 每个目录动作对应一个子命令，参数顺序与线缆字段顺序一致。词表参数
//! 接受名称（大小写不敏感）或数字代码，数值参数接受十进制或 `0x` 十六进制。

use clap::{Args, ValueEnum};
use sanbot_sdk::protocol::{
    ArmAction, ArmPart, HeadAction, HeadAxis, HeadDirection, HeadLock, ProtocolError,
    RobotCommand, WheelAction, parse_byte, parse_word,
};

fn byte(token: &str) -> Result<u8, ProtocolError> {
    parse_byte(token, "byte")
}

fn word(token: &str) -> Result<u16, ProtocolError> {
    parse_word(token, "word")
}

#[derive(Args, Debug, Clone)]
pub struct WheelNoAngleArgs {
    pub action: WheelAction,
    #[arg(value_parser = byte)]
    pub speed: u8,
    /// 持续时间
    #[arg(value_parser = word)]
    pub duration: u16,
    #[arg(value_parser = byte)]
    pub duration_mode: u8,
}

#[derive(Args, Debug, Clone)]
pub struct WheelRelativeArgs {
    pub action: WheelAction,
    #[arg(value_parser = byte)]
    pub speed: u8,
    /// 旋转角度（度）
    #[arg(value_parser = word)]
    pub angle: u16,
}

#[derive(Args, Debug, Clone)]
pub struct WheelTimedArgs {
    pub action: WheelAction,
    /// 运动时间（毫秒）
    #[arg(value_parser = word)]
    pub time: u16,
    #[arg(value_parser = byte)]
    pub degree: u8,
}

#[derive(Args, Debug, Clone)]
pub struct WheelDistanceArgs {
    pub action: WheelAction,
    #[arg(value_parser = byte)]
    pub speed: u8,
    /// 距离（毫米）
    #[arg(value_parser = word)]
    pub distance: u16,
}

#[derive(Args, Debug, Clone)]
pub struct ArmNoAngleArgs {
    pub part: ArmPart,
    #[arg(value_parser = byte)]
    pub speed: u8,
    pub action: ArmAction,
}

#[derive(Args, Debug, Clone)]
pub struct ArmRelativeArgs {
    pub part: ArmPart,
    #[arg(value_parser = byte)]
    pub speed: u8,
    pub action: ArmAction,
    #[arg(value_parser = word)]
    pub angle: u16,
}

#[derive(Args, Debug, Clone)]
pub struct ArmAbsoluteArgs {
    pub part: ArmPart,
    #[arg(value_parser = byte)]
    pub speed: u8,
    #[arg(value_parser = word)]
    pub angle: u16,
}

#[derive(Args, Debug, Clone)]
pub struct HeadNoAngleArgs {
    pub action: HeadAction,
    #[arg(value_parser = byte)]
    pub speed: u8,
}

#[derive(Args, Debug, Clone)]
pub struct HeadRelativeArgs {
    pub action: HeadAction,
    #[arg(value_parser = word)]
    pub angle: u16,
}

#[derive(Args, Debug, Clone)]
pub struct HeadAbsoluteArgs {
    pub axis: HeadAxis,
    #[arg(value_parser = word)]
    pub angle: u16,
}

#[derive(Args, Debug, Clone)]
pub struct HeadLocateAbsoluteArgs {
    pub lock: HeadLock,
    #[arg(value_parser = word)]
    pub horizontal: u16,
    #[arg(value_parser = word)]
    pub vertical: u16,
}

#[derive(Args, Debug, Clone)]
pub struct HeadLocateRelativeArgs {
    pub lock: HeadLock,
    pub horizontal_direction: HeadDirection,
    #[arg(value_parser = byte)]
    pub horizontal_angle: u8,
    pub vertical_direction: HeadDirection,
    #[arg(value_parser = byte)]
    pub vertical_angle: u8,
}

impl From<WheelNoAngleArgs> for RobotCommand {
    fn from(a: WheelNoAngleArgs) -> Self {
        RobotCommand::WheelNoAngle {
            action: a.action,
            speed: a.speed,
            duration: a.duration,
            duration_mode: a.duration_mode,
        }
    }
}

impl From<WheelRelativeArgs> for RobotCommand {
    fn from(a: WheelRelativeArgs) -> Self {
        RobotCommand::WheelRelative {
            action: a.action,
            speed: a.speed,
            angle: a.angle,
        }
    }
}

impl From<WheelTimedArgs> for RobotCommand {
    fn from(a: WheelTimedArgs) -> Self {
        RobotCommand::WheelTimed {
            action: a.action,
            time: a.time,
            degree: a.degree,
        }
    }
}

impl From<WheelDistanceArgs> for RobotCommand {
    fn from(a: WheelDistanceArgs) -> Self {
        RobotCommand::WheelDistance {
            action: a.action,
            speed: a.speed,
            distance: a.distance,
        }
    }
}

impl From<ArmNoAngleArgs> for RobotCommand {
    fn from(a: ArmNoAngleArgs) -> Self {
        RobotCommand::ArmNoAngle {
            part: a.part,
            speed: a.speed,
            action: a.action,
        }
    }
}

impl From<ArmRelativeArgs> for RobotCommand {
    fn from(a: ArmRelativeArgs) -> Self {
        RobotCommand::ArmRelative {
            part: a.part,
            speed: a.speed,
            action: a.action,
            angle: a.angle,
        }
    }
}

impl From<ArmAbsoluteArgs> for RobotCommand {
    fn from(a: ArmAbsoluteArgs) -> Self {
        RobotCommand::ArmAbsolute {
            part: a.part,
            speed: a.speed,
            angle: a.angle,
        }
    }
}

impl From<HeadNoAngleArgs> for RobotCommand {
    fn from(a: HeadNoAngleArgs) -> Self {
        RobotCommand::HeadNoAngle {
            action: a.action,
            speed: a.speed,
        }
    }
}

impl From<HeadRelativeArgs> for RobotCommand {
    fn from(a: HeadRelativeArgs) -> Self {
        RobotCommand::HeadRelative {
            action: a.action,
            angle: a.angle,
        }
    }
}

impl From<HeadAbsoluteArgs> for RobotCommand {
    fn from(a: HeadAbsoluteArgs) -> Self {
        RobotCommand::HeadAbsolute {
            axis: a.axis,
            angle: a.angle,
        }
    }
}

impl From<HeadLocateAbsoluteArgs> for RobotCommand {
    fn from(a: HeadLocateAbsoluteArgs) -> Self {
        RobotCommand::HeadLocateAbsolute {
            lock: a.lock,
            horizontal: a.horizontal,
            vertical: a.vertical,
        }
    }
}

impl From<HeadLocateRelativeArgs> for RobotCommand {
    fn from(a: HeadLocateRelativeArgs) -> Self {
        RobotCommand::HeadLocateRelative {
            lock: a.lock,
            horizontal_direction: a.horizontal_direction,
            horizontal_angle: a.horizontal_angle,
            vertical_direction: a.vertical_direction,
            vertical_angle: a.vertical_angle,
        }
    }
}

/// 原始帧的目标
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawTarget {
    /// 直接写入头部板
    Head,
    /// 直接写入底盘板
    Bottom,
    /// 按缓冲区末尾的路由标签分发
    Point,
}

/// 原始帧
#[derive(Args, Debug, Clone)]
pub struct RawArgs {
    pub target: RawTarget,

    /// 十六进制字节（允许空格，如 "A4 03 00 00 ..."）
    #[arg(required = true, num_args = 1..)]
    pub hex: Vec<String>,
}

impl RawArgs {
    pub fn bytes(&self) -> anyhow::Result<Vec<u8>> {
        let joined: String = self
            .hex
            .iter()
            .flat_map(|s| s.chars())
            .filter(|c| !c.is_whitespace())
            .collect();
        Ok(hex::decode(joined)?)
    }
}

/// 手臂演示序列：左右手臂依次上下摆动
#[derive(Args, Debug, Clone)]
pub struct ArmDemoArgs {
    /// 每步之间的停顿（毫秒）
    #[arg(long, default_value_t = 300)]
    pub pause_ms: u64,

    /// 重复次数
    #[arg(long, default_value_t = 1)]
    pub cycles: u32,

    /// 每步角度（度）
    #[arg(long, default_value_t = 5, value_parser = word)]
    pub angle: u16,

    #[arg(long, default_value_t = 5, value_parser = byte)]
    pub speed: u8,
}

impl ArmDemoArgs {
    pub fn sequence(&self) -> Vec<RobotCommand> {
        let step = |part, action| RobotCommand::ArmRelative {
            part,
            speed: self.speed,
            action,
            angle: self.angle,
        };
        let one_cycle = [
            step(ArmPart::Left, ArmAction::Up),
            step(ArmPart::Left, ArmAction::Down),
            step(ArmPart::Right, ArmAction::Up),
            step(ArmPart::Right, ArmAction::Down),
        ];
        (0..self.cycles).flat_map(|_| one_cycle).collect()
    }
}
