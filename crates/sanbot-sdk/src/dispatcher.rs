//! 命令分发
//!
//! 把 `RobotCommand` 经过安全检查后组装为带标签缓冲区，交给传输管理器，
//! 并可选地写入追加式命令日志。

use bytes::Bytes;
use sanbot_driver::{DriverError, UsbManager};
use sanbot_protocol::RobotCommand;
use sanbot_tools::{CommandLog, LogEntry, SafetyError, SafetyValidator};
use sanbot_usb::{RusbBackend, UsbBackend};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Safety check failed: {0}")]
    Safety(#[from] SafetyError),

    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),
}

/// 命令参数的文本形式（与 CLI 参数顺序一致）
pub fn command_args(command: &RobotCommand) -> Vec<String> {
    match *command {
        RobotCommand::WheelNoAngle {
            action,
            speed,
            duration,
            duration_mode,
        } => vec![
            action.to_string(),
            speed.to_string(),
            duration.to_string(),
            duration_mode.to_string(),
        ],
        RobotCommand::WheelRelative {
            action,
            speed,
            angle,
        } => vec![action.to_string(), speed.to_string(), angle.to_string()],
        RobotCommand::WheelTimed {
            action,
            time,
            degree,
        } => vec![action.to_string(), time.to_string(), degree.to_string()],
        RobotCommand::WheelDistance {
            action,
            speed,
            distance,
        } => vec![action.to_string(), speed.to_string(), distance.to_string()],
        RobotCommand::ArmNoAngle {
            part,
            speed,
            action,
        } => vec![part.to_string(), speed.to_string(), action.to_string()],
        RobotCommand::ArmRelative {
            part,
            speed,
            action,
            angle,
        } => vec![
            part.to_string(),
            speed.to_string(),
            action.to_string(),
            angle.to_string(),
        ],
        RobotCommand::ArmAbsolute { part, speed, angle } => {
            vec![part.to_string(), speed.to_string(), angle.to_string()]
        },
        RobotCommand::HeadNoAngle { action, speed } => vec![action.to_string(), speed.to_string()],
        RobotCommand::HeadRelative { action, angle } => vec![action.to_string(), angle.to_string()],
        RobotCommand::HeadAbsolute { axis, angle } => vec![axis.to_string(), angle.to_string()],
        RobotCommand::HeadCentre => Vec::new(),
        RobotCommand::HeadLocateAbsolute {
            lock,
            horizontal,
            vertical,
        } => vec![lock.to_string(), horizontal.to_string(), vertical.to_string()],
        RobotCommand::HeadLocateRelative {
            lock,
            horizontal_direction,
            horizontal_angle,
            vertical_direction,
            vertical_angle,
        } => vec![
            lock.to_string(),
            horizontal_direction.to_string(),
            horizontal_angle.to_string(),
            vertical_direction.to_string(),
            vertical_angle.to_string(),
        ],
    }
}

/// 安全检查后组装带标签缓冲区（不接触 USB）
pub fn prepare(validator: &SafetyValidator, command: &RobotCommand) -> Result<Bytes, SafetyError> {
    validator.check(command)?;
    Ok(command.to_routed())
}

/// 命令分发器
pub struct Dispatcher<B: UsbBackend = RusbBackend> {
    manager: UsbManager<B>,
    validator: SafetyValidator,
    log: Option<CommandLog>,
}

impl<B: UsbBackend> Dispatcher<B> {
    pub fn new(manager: UsbManager<B>, validator: SafetyValidator) -> Self {
        Self {
            manager,
            validator,
            log: None,
        }
    }

    /// 附加命令日志
    pub fn with_log(mut self, log: CommandLog) -> Self {
        self.log = Some(log);
        self
    }

    pub fn manager(&self) -> &UsbManager<B> {
        &self.manager
    }

    pub fn validator(&self) -> &SafetyValidator {
        &self.validator
    }

    /// 检查、入队并记录一条命令，返回入队的带标签缓冲区
    ///
    /// 入队成功即返回，不等待 USB 传输完成。
    pub fn execute(&mut self, command: &RobotCommand) -> Result<Bytes, DispatchError> {
        let routed = prepare(&self.validator, command)?;
        debug!("Dispatching {} ({} bytes)", command.name(), routed.len());
        self.manager.send_to_point(routed.clone())?;

        if let Some(log) = self.log.as_mut() {
            let entry = LogEntry::now(command.name(), command_args(command), &routed);
            // 日志失败不影响已入队的命令
            if let Err(e) = log.append(&entry) {
                warn!("Failed to append to command log {}: {}", log.path().display(), e);
            }
        }

        Ok(routed)
    }

    /// 等待所有已入队命令发送完毕
    pub fn flush(&self) {
        self.manager.wait_for_pending_sends();
    }

    /// 取回传输管理器
    pub fn into_manager(self) -> UsbManager<B> {
        self.manager
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sanbot_protocol::{ArmAction, ArmPart, HeadDirection, HeadLock, WheelAction};

    #[test]
    fn test_command_args() {
        assert_eq!(
            command_args(&RobotCommand::WheelDistance {
                action: WheelAction::Forward,
                speed: 50,
                distance: 1000,
            }),
            vec!["forward", "50", "1000"]
        );
        assert_eq!(
            command_args(&RobotCommand::ArmRelative {
                part: ArmPart::Raw(9),
                speed: 5,
                action: ArmAction::Up,
                angle: 5,
            }),
            vec!["0x09", "5", "up", "5"]
        );
        assert_eq!(
            command_args(&RobotCommand::HeadLocateRelative {
                lock: HeadLock::NoLock,
                horizontal_direction: HeadDirection::RightOrDown,
                horizontal_angle: 10,
                vertical_direction: HeadDirection::LeftOrUp,
                vertical_angle: 20,
            }),
            vec!["no-lock", "right", "10", "left", "20"]
        );
        assert!(command_args(&RobotCommand::HeadCentre).is_empty());
    }

    #[test]
    fn test_prepare_rejects_out_of_range() {
        let validator = SafetyValidator::default();
        let command = RobotCommand::WheelNoAngle {
            action: WheelAction::Forward,
            speed: 250,
            duration: 0,
            duration_mode: 0,
        };
        assert!(prepare(&validator, &command).is_err());

        let mut bypassed = SafetyValidator::default();
        bypassed.set_bypass(true);
        assert_eq!(prepare(&bypassed, &command).unwrap(), command.to_routed());
    }
}
