//! # 安全限制
//!
//! 在构建负载之前对运动参数做范围检查。目录层本身只截断、不校验，
//! 因此越界检查由这里（调用方）负责。所有边界都是闭区间。

use sanbot_protocol::RobotCommand;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 安全检查错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SafetyError {
    #[error("{field} out of range [{min}..{max}]: {value}")]
    OutOfRange {
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },
}

/// 运动限制
///
/// 设备本身接受 0..=255 的速度，默认值保留余量。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyLimits {
    // 轮子
    pub wheel_speed_max: u32,
    pub wheel_time_ms_min: u32,
    pub wheel_time_ms_max: u32,
    pub wheel_distance_mm_max: u32,
    pub wheel_spin_deg_max: u32,

    // 头部
    pub head_speed_max: u32,
    pub head_horizontal_deg_max: u32,
    pub head_vertical_deg_max: u32,
    pub head_axis_deg_max: u32,

    // 手臂
    pub arm_speed_max: u32,
    pub arm_deg_max: u32,
}

impl Default for SafetyLimits {
    fn default() -> Self {
        Self {
            wheel_speed_max: 200,
            wheel_time_ms_min: 1,
            wheel_time_ms_max: 5000,
            wheel_distance_mm_max: 3000,
            wheel_spin_deg_max: 360,

            head_speed_max: 200,
            head_horizontal_deg_max: 180,
            head_vertical_deg_max: 90,
            head_axis_deg_max: 90,

            arm_speed_max: 200,
            arm_deg_max: 90,
        }
    }
}

/// 安全检查器
#[derive(Debug, Clone, Default)]
pub struct SafetyValidator {
    limits: SafetyLimits,
    bypass: bool,
}

impl SafetyValidator {
    pub fn new(limits: SafetyLimits) -> Self {
        Self {
            limits,
            bypass: false,
        }
    }

    /// 跳过所有检查（不推荐）
    pub fn set_bypass(&mut self, bypass: bool) {
        self.bypass = bypass;
    }

    pub fn is_bypassed(&self) -> bool {
        self.bypass
    }

    pub fn limits(&self) -> &SafetyLimits {
        &self.limits
    }

    /// 检查一条命令的参数
    pub fn check(&self, command: &RobotCommand) -> Result<(), SafetyError> {
        if self.bypass {
            return Ok(());
        }
        let l = &self.limits;

        match *command {
            RobotCommand::WheelNoAngle { speed, .. } => {
                in_range("wheel speed", speed, 0, l.wheel_speed_max)
            },
            RobotCommand::WheelRelative { speed, angle, .. } => {
                in_range("wheel speed", speed, 0, l.wheel_speed_max)?;
                in_range("wheel spin deg", angle, 0, l.wheel_spin_deg_max)
            },
            RobotCommand::WheelTimed { time, .. } => in_range(
                "wheel time ms",
                time,
                l.wheel_time_ms_min,
                l.wheel_time_ms_max,
            ),
            RobotCommand::WheelDistance {
                speed, distance, ..
            } => {
                in_range("wheel speed", speed, 0, l.wheel_speed_max)?;
                in_range("wheel distance mm", distance, 0, l.wheel_distance_mm_max)
            },
            RobotCommand::ArmNoAngle { speed, .. } => in_range("arm speed", speed, 0, l.arm_speed_max),
            RobotCommand::ArmRelative { speed, angle, .. }
            | RobotCommand::ArmAbsolute { speed, angle, .. } => {
                in_range("arm speed", speed, 0, l.arm_speed_max)?;
                in_range("arm deg", angle, 0, l.arm_deg_max)
            },
            RobotCommand::HeadNoAngle { speed, .. } => in_range("head speed", speed, 0, l.head_speed_max),
            RobotCommand::HeadRelative { angle, .. } | RobotCommand::HeadAbsolute { angle, .. } => {
                in_range("head deg", angle, 0, l.head_axis_deg_max)
            },
            RobotCommand::HeadCentre => Ok(()),
            RobotCommand::HeadLocateAbsolute {
                horizontal,
                vertical,
                ..
            } => {
                in_range("head horizontal deg", horizontal, 0, l.head_horizontal_deg_max)?;
                in_range("head vertical deg", vertical, 0, l.head_vertical_deg_max)
            },
            RobotCommand::HeadLocateRelative {
                horizontal_angle,
                vertical_angle,
                ..
            } => {
                in_range("head horizontal deg", horizontal_angle, 0, l.head_axis_deg_max)?;
                in_range("head vertical deg", vertical_angle, 0, l.head_axis_deg_max)
            },
        }
    }
}

fn in_range(field: &'static str, value: impl Into<u32>, min: u32, max: u32) -> Result<(), SafetyError> {
    let value = value.into();
    if value < min || value > max {
        return Err(SafetyError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}
