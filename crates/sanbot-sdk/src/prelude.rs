//! Prelude - 常用类型的便捷导入
//!
//! ```rust
//! use sanbot_sdk::prelude::*;
//! ```

// 命令目录与词表
pub use sanbot_protocol::{
    ArmAction, ArmPart, HeadAction, HeadAxis, HeadDirection, HeadLock, RobotCommand,
    RoutingTag, WheelAction,
};

// 传输
pub use sanbot_driver::{ManagerConfig, TransportSnapshot, UsbManager};

// 分发与安全
pub use crate::dispatcher::Dispatcher;
pub use sanbot_tools::{CommandLog, SafetyLimits, SafetyValidator};

// 错误类型
pub use crate::dispatcher::DispatchError;
pub use sanbot_driver::DriverError;
pub use sanbot_protocol::ProtocolError;
pub use sanbot_usb::UsbError;
