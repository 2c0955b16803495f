//! 传输层指标
//!
//! 发送是 fire-and-forget 的，调用方拿不到单次发送的结果；被丢弃的发送
//! 只能通过这些计数器和日志观察到。所有计数器都是原子的，可以在任何
//! 线程读取。

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// 单个逻辑端点（头部 / 底盘）的指标
#[derive(Debug, Default)]
pub struct BoardMetrics {
    /// 成功的批量写入次数
    pub transfers_ok: AtomicU64,
    /// 失败的批量写入次数（错误或 0 字节）
    pub transfer_failures: AtomicU64,
    /// 成功写入的总字节数
    pub bytes_written: AtomicU64,
    /// 设备解析失败次数（未找到设备 / 无 Bulk 端点 / claim 失败）
    pub resolution_failures: AtomicU64,
    /// 达到阈值后执行的关闭-重开次数
    pub reconnects: AtomicU64,
    /// 当前是否持有已 claim 的句柄
    pub is_open: AtomicBool,
}

impl BoardMetrics {
    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            transfers_ok: self.transfers_ok.load(Ordering::Relaxed),
            transfer_failures: self.transfer_failures.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
            resolution_failures: self.resolution_failures.load(Ordering::Relaxed),
            reconnects: self.reconnects.load(Ordering::Relaxed),
            is_open: self.is_open.load(Ordering::Relaxed),
        }
    }
}

/// 传输管理器指标
#[derive(Debug, Default)]
pub struct TransportMetrics {
    pub head: BoardMetrics,
    pub bottom: BoardMetrics,
    /// 入队的消息数
    pub enqueued: AtomicU64,
    /// 工作线程处理完成的消息数
    pub dispatched: AtomicU64,
    /// 因路由标签非法而丢弃的消息数（不计入设备失败）
    pub malformed_tags: AtomicU64,
}

impl TransportMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> TransportSnapshot {
        TransportSnapshot {
            head: self.head.snapshot(),
            bottom: self.bottom.snapshot(),
            enqueued: self.enqueued.load(Ordering::Relaxed),
            dispatched: self.dispatched.load(Ordering::Relaxed),
            malformed_tags: self.malformed_tags.load(Ordering::Relaxed),
        }
    }
}

/// 单端点指标快照
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoardSnapshot {
    pub transfers_ok: u64,
    pub transfer_failures: u64,
    pub bytes_written: u64,
    pub resolution_failures: u64,
    pub reconnects: u64,
    pub is_open: bool,
}

/// 传输层指标快照
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransportSnapshot {
    pub head: BoardSnapshot,
    pub bottom: BoardSnapshot,
    pub enqueued: u64,
    pub dispatched: u64,
    pub malformed_tags: u64,
}

impl TransportSnapshot {
    /// 两个端点被丢弃的发送总数（传输失败 + 设备解析失败）
    pub fn total_failures(&self) -> u64 {
        self.head.transfer_failures
            + self.head.resolution_failures
            + self.bottom.transfer_failures
            + self.bottom.resolution_failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_snapshot() {
        let metrics = TransportMetrics::new();
        metrics.enqueued.fetch_add(3, Ordering::Relaxed);
        metrics.head.transfers_ok.fetch_add(2, Ordering::Relaxed);
        metrics.head.bytes_written.fetch_add(50, Ordering::Relaxed);
        metrics.bottom.transfer_failures.fetch_add(1, Ordering::Relaxed);
        metrics.head.is_open.store(true, Ordering::Relaxed);

        let snap = metrics.snapshot();
        assert_eq!(snap.enqueued, 3);
        assert_eq!(snap.head.transfers_ok, 2);
        assert_eq!(snap.head.bytes_written, 50);
        assert!(snap.head.is_open);
        assert!(!snap.bottom.is_open);
        assert_eq!(snap.total_failures(), 1);

        metrics.head.resolution_failures.fetch_add(2, Ordering::Relaxed);
        assert_eq!(metrics.snapshot().total_failures(), 3);
    }
}
