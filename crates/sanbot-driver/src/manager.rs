//! USB 传输管理器
//!
//! 对外只暴露消息入队接口；设备句柄和失败计数全部封装在工作线程内部。

use crate::config::ManagerConfig;
use crate::error::DriverError;
use crate::metrics::{TransportMetrics, TransportSnapshot};
use crate::queue::{Message, SendQueue, Target};
use crate::worker::Worker;
use bytes::Bytes;
use sanbot_usb::{RusbBackend, UsbBackend};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{error, info, trace, warn};

/// USB 传输管理器
///
/// 一个后台工作线程负责所有批量写入；任意数量的调用线程可以并发调用
/// `send_*`。发送是 fire-and-forget 的：入队即返回，失败只体现在指标和日志中。
///
/// # 示例
///
/// ```no_run
/// use sanbot_driver::UsbManager;
/// use sanbot_protocol::build_head_centre_lock;
///
/// let manager = UsbManager::new()?;
/// manager.send_to_point(build_head_centre_lock())?;
/// manager.wait_for_pending_sends();
/// # Ok::<(), sanbot_driver::DriverError>(())
/// ```
pub struct UsbManager<B: UsbBackend = RusbBackend> {
    queue: Arc<SendQueue>,
    metrics: Arc<TransportMetrics>,
    worker: Option<JoinHandle<Worker<B>>>,
}

impl UsbManager<RusbBackend> {
    /// 使用默认配置创建管理器
    ///
    /// libusb 上下文初始化失败时返回错误，没有降级模式。
    pub fn new() -> Result<Self, DriverError> {
        Self::with_config(ManagerConfig::default())
    }

    pub fn with_config(config: ManagerConfig) -> Result<Self, DriverError> {
        let backend = RusbBackend::new()?;
        Self::with_backend(backend, config)
    }
}

impl<B: UsbBackend> UsbManager<B> {
    /// 使用指定后端创建管理器并启动工作线程
    pub fn with_backend(backend: B, config: ManagerConfig) -> Result<Self, DriverError> {
        let queue = Arc::new(SendQueue::new());
        let metrics = Arc::new(TransportMetrics::new());
        let worker = Worker::new(backend, &config, Arc::clone(&queue), Arc::clone(&metrics));

        let handle = thread::Builder::new()
            .name("sanbot-usb".into())
            .spawn(move || worker.run())
            .map_err(DriverError::WorkerSpawn)?;

        info!(
            "USB manager started (vid {:04x}, head {:04x}, bottom {:04x})",
            config.vendor_id, config.head_product_id, config.bottom_product_id
        );

        Ok(Self {
            queue,
            metrics,
            worker: Some(handle),
        })
    }

    fn enqueue(&self, target: Target, bytes: Bytes) -> Result<(), DriverError> {
        let len = bytes.len();
        match self.queue.push(Message { target, bytes }) {
            Ok(()) => {
                self.metrics.enqueued.fetch_add(1, Ordering::Relaxed);
                trace!("Enqueued {} bytes for {:?}", len, target);
                Ok(())
            },
            Err(_) => {
                warn!("Send of {} bytes rejected: manager shut down", len);
                Err(DriverError::ShutDown)
            },
        }
    }

    /// 发送到头部控制板
    pub fn send_to_head(&self, bytes: impl Into<Bytes>) -> Result<(), DriverError> {
        self.enqueue(Target::Head, bytes.into())
    }

    /// 发送到底盘控制板
    pub fn send_to_bottom(&self, bytes: impl Into<Bytes>) -> Result<(), DriverError> {
        self.enqueue(Target::Bottom, bytes.into())
    }

    /// 发送带路由标签的缓冲区，标签在出队时解析
    pub fn send_to_point(&self, routed: impl Into<Bytes>) -> Result<(), DriverError> {
        self.enqueue(Target::Point, routed.into())
    }

    /// 阻塞直到队列排空、最后一条消息已提交给设备
    ///
    /// 不代表设备已经确认收到。
    pub fn wait_for_pending_sends(&self) {
        self.queue.wait_idle();
    }

    /// 带超时的 `wait_for_pending_sends`，返回是否已排空
    pub fn wait_for_pending_sends_timeout(&self, timeout: Duration) -> bool {
        self.queue.wait_idle_timeout(timeout)
    }

    /// 尚未出队的消息数
    pub fn pending(&self) -> usize {
        self.queue.pending()
    }

    pub fn metrics(&self) -> TransportSnapshot {
        self.metrics.snapshot()
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some() && self.queue.is_running()
    }

    /// 停止工作线程，然后释放两个端点并销毁 USB 上下文
    ///
    /// 正在进行的传输不会被取消，关闭会等待它自然结束；队列中尚未出队的
    /// 消息被丢弃。重复调用无副作用。
    pub fn shutdown(&mut self) {
        let Some(handle) = self.worker.take() else {
            return;
        };

        self.queue.close();
        let dropped = self.queue.pending();
        if dropped > 0 {
            warn!("Shutting down with {} unsent messages", dropped);
        }

        match handle.join() {
            Ok(worker) => worker.shutdown(),
            Err(_) => error!("USB worker thread panicked"),
        }
        info!("USB manager shut down");
    }
}

impl<B: UsbBackend> Drop for UsbManager<B> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
