//! # Sanbot Driver
//!
//! 头部 / 底盘两块控制板的 USB 传输管理器。
//!
//! ## 架构
//!
//! ```text
//! 调用线程 (任意数量)
//!     │ send_to_head / send_to_bottom / send_to_point
//!     ▼
//! SendQueue (Mutex + Condvar, FIFO)
//!     │ pop
//!     ▼
//! Worker 线程 ──▶ Endpoint(head)   ──▶ USB Bulk OUT
//!             └─▶ Endpoint(bottom) ──▶ USB Bulk OUT
//! ```
//!
//! - 所有 USB 传输都在唯一的工作线程上执行，端点状态无需加锁
//! - 传输失败计入连续失败计数，每达到阈值执行一次关闭-重开
//! - 非法路由标签静默丢弃，只计入 `malformed_tags`

pub mod config;
pub mod endpoint;
pub mod error;
pub mod manager;
pub mod metrics;
pub mod queue;
mod worker;

pub use config::{DEFAULT_RECONNECT_THRESHOLD, ManagerConfig};
pub use endpoint::{Board, Endpoint, SendOutcome};
pub use error::DriverError;
pub use manager::UsbManager;
pub use metrics::{BoardMetrics, BoardSnapshot, TransportMetrics, TransportSnapshot};
pub use queue::{Message, SendQueue, Target};
