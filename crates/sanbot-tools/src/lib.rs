//! # Sanbot Tools - 共享工具
//!
//! **依赖原则**: 只依赖 `sanbot-protocol`，不引入 USB / 驱动层
//!
//! ## 包含模块
//!
//! - `safety` - 运动参数安全限制（在构建负载之前检查）
//! - `history` - 追加式命令日志

pub mod history;
pub mod safety;

pub use history::{CommandLog, LogEntry};
pub use safety::{SafetyError, SafetyLimits, SafetyValidator};
