//! 驱动层错误类型定义

use sanbot_usb::UsbError;
use thiserror::Error;

/// 驱动层错误类型
///
/// 只有构造阶段的失败会以错误形式返回；稳态下的设备断开、传输失败
/// 由失败计数和重连机制吸收。
#[derive(Error, Debug)]
pub enum DriverError {
    /// USB 子系统错误（例如 libusb 上下文初始化失败）
    #[error("USB error: {0}")]
    Usb(#[from] UsbError),

    /// 无法启动工作线程
    #[error("Failed to spawn USB worker thread: {0}")]
    WorkerSpawn(#[source] std::io::Error),

    /// 管理器已关闭，不再接受发送
    #[error("USB manager has been shut down")]
    ShutDown,
}
