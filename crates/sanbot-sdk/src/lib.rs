//! Sanbot SDK - Sanbot 头部 / 底盘控制板 Rust SDK
//!
//! # 架构设计
//!
//! 本 SDK 采用分层架构，从底层到高层：
//!
//! - **协议层** (`protocol`): 帧组装、命令目录、动作代码词表
//! - **USB 层** (`usb`): 设备枚举、Bulk 端点解析、接口 claim
//! - **驱动层** (`driver`): 单写线程传输管理器、失败重连、指标
//! - **工具** (`tools`): 安全限制、命令日志
//!
//! # 快速开始
//!
//! ```no_run
//! use sanbot_sdk::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! sanbot_sdk::init_logging();
//!
//! let manager = UsbManager::new()?;
//! let mut dispatcher = Dispatcher::new(manager, SafetyValidator::default());
//! dispatcher.execute(&RobotCommand::HeadCentre)?;
//! dispatcher.flush();
//! # Ok(())
//! # }
//! ```

pub mod dispatcher;
pub mod logging;
pub mod prelude;

pub use sanbot_driver as driver;
pub use sanbot_protocol as protocol;
pub use sanbot_tools as tools;
pub use sanbot_usb as usb;

pub use dispatcher::{DispatchError, Dispatcher, command_args, prepare};
pub use logging::{LoggingError, init_logging, try_init_logging};

pub use sanbot_driver::{DriverError, ManagerConfig, UsbManager};
pub use sanbot_protocol::{ProtocolError, RobotCommand};
pub use sanbot_usb::UsbError;
