//! 逻辑端点：设备生命周期和失败/重连策略
//!
//! ```text
//! Closed ──解析成功──▶ Open ──单次失败──▶ Open
//!   ▲                   │
//!   └──关闭 / 达到阈值──┘（随后立即尝试重开）
//! ```
//!
//! 端点只由工作线程修改，因此不需要加锁。

use crate::metrics::BoardMetrics;
use sanbot_usb::{BulkHandle, OpenedEndpoint, UsbBackend, UsbError, open_bulk_endpoint};
use std::fmt;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tracing::{debug, info, trace, warn};

/// 控制板
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Board {
    Head,
    Bottom,
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Board::Head => f.write_str("head"),
            Board::Bottom => f.write_str("bottom"),
        }
    }
}

/// 单次发送的结果（只供工作线程和测试观察）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Sent(usize),
    /// 设备未能解析，发送被丢弃
    Unresolved,
    /// 传输失败（错误或 0 字节）
    Failed,
    /// 空缓冲区，不接触设备也不计数
    Skipped,
}

/// 逻辑端点
pub struct Endpoint<H> {
    board: Board,
    vendor_id: u16,
    product_id: u16,
    opened: Option<OpenedEndpoint<H>>,
    consecutive_failures: u32,
    reconnect_threshold: u32,
    timeout: Duration,
}

impl<H: BulkHandle> Endpoint<H> {
    pub fn new(
        board: Board,
        vendor_id: u16,
        product_id: u16,
        reconnect_threshold: u32,
        timeout: Duration,
    ) -> Self {
        Self {
            board,
            vendor_id,
            product_id,
            opened: None,
            consecutive_failures: 0,
            reconnect_threshold,
            timeout,
        }
    }

    pub fn board(&self) -> Board {
        self.board
    }

    pub fn is_open(&self) -> bool {
        self.opened.is_some()
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// 解析设备并 claim 接口
    pub fn open<B>(&mut self, backend: &B, metrics: &BoardMetrics) -> Result<(), UsbError>
    where
        B: UsbBackend<Handle = H>,
    {
        let opened = open_bulk_endpoint(backend, self.vendor_id, self.product_id)?;
        info!(
            "Opened {} board {:04x}:{:04x} (interface {}, OUT 0x{:02x})",
            self.board, self.vendor_id, self.product_id, opened.interface_number, opened.out_endpoint
        );
        self.opened = Some(opened);
        self.consecutive_failures = 0;
        metrics.is_open.store(true, Ordering::Relaxed);
        Ok(())
    }

    /// 释放接口并关闭句柄
    pub fn close(&mut self, metrics: &BoardMetrics) {
        if let Some(mut opened) = self.opened.take() {
            opened.handle.release();
            info!("Closed {} board", self.board);
        }
        metrics.is_open.store(false, Ordering::Relaxed);
    }

    /// 发送一帧
    ///
    /// 没有打开的句柄时先解析设备；解析失败则丢弃本次发送并计为一次失败。
    pub fn send<B>(&mut self, backend: &B, data: &[u8], metrics: &BoardMetrics) -> SendOutcome
    where
        B: UsbBackend<Handle = H>,
    {
        if data.is_empty() {
            trace!("Skipping empty send to {} board", self.board);
            return SendOutcome::Skipped;
        }

        if self.opened.is_none()
            && let Err(e) = self.open(backend, metrics)
        {
            warn!("Dropping {} byte send to {} board: {}", data.len(), self.board, e);
            metrics.resolution_failures.fetch_add(1, Ordering::Relaxed);
            self.record_failure(backend, metrics);
            return SendOutcome::Unresolved;
        }

        let Some(opened) = self.opened.as_mut() else {
            return SendOutcome::Unresolved;
        };

        let endpoint = opened.out_endpoint;
        let written = opened
            .handle
            .write_bulk(endpoint, data, self.timeout)
            .and_then(|n| match n {
                0 => Err(UsbError::ZeroLengthWrite {
                    endpoint,
                    expected: data.len(),
                }),
                n => Ok(n),
            });

        match written {
            Ok(n) => {
                if n < data.len() {
                    debug!("Short write to {} board: {} of {} bytes", self.board, n, data.len());
                }
                trace!("Wrote {} bytes to {} board", n, self.board);
                self.consecutive_failures = 0;
                metrics.transfers_ok.fetch_add(1, Ordering::Relaxed);
                metrics.bytes_written.fetch_add(n as u64, Ordering::Relaxed);
                return SendOutcome::Sent(n);
            },
            Err(e) => {
                warn!("Bulk write to {} board failed: {}", self.board, e);
            },
        }

        metrics.transfer_failures.fetch_add(1, Ordering::Relaxed);
        self.record_failure(backend, metrics);
        SendOutcome::Failed
    }

    fn record_failure<B>(&mut self, backend: &B, metrics: &BoardMetrics)
    where
        B: UsbBackend<Handle = H>,
    {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        if self.reconnect_threshold > 0 && self.consecutive_failures >= self.reconnect_threshold {
            warn!(
                "{} consecutive failures on {} board, reconnecting",
                self.consecutive_failures, self.board
            );
            self.reconnect(backend, metrics);
        }
    }

    /// 关闭-重开；重开失败时保持关闭，下一次发送会再次解析
    fn reconnect<B>(&mut self, backend: &B, metrics: &BoardMetrics)
    where
        B: UsbBackend<Handle = H>,
    {
        self.close(metrics);
        self.consecutive_failures = 0;
        metrics.reconnects.fetch_add(1, Ordering::Relaxed);
        if let Err(e) = self.open(backend, metrics) {
            warn!("Reopen of {} board failed: {}", self.board, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sanbot_usb::rusb;
    use sanbot_usb::{MockBackend, MockEvent, MockHandle, MockWrite};

    const VID: u16 = 0x0483;
    const PID: u16 = 0x5741;

    fn setup() -> (MockBackend, Endpoint<MockHandle>, BoardMetrics) {
        let backend = MockBackend::new().with_device(MockBackend::board_info(VID, PID));
        let endpoint = Endpoint::new(Board::Head, VID, PID, 10, Duration::ZERO);
        (backend, endpoint, BoardMetrics::default())
    }

    #[test]
    fn test_lazy_open_on_first_send() {
        let (backend, mut ep, metrics) = setup();
        assert!(!ep.is_open());
        assert_eq!(ep.send(&backend, &[1, 2, 3], &metrics), SendOutcome::Sent(3));
        assert!(ep.is_open());
        assert!(metrics.is_open.load(Ordering::Relaxed));
        assert_eq!(backend.claim_count(PID), 1);

        ep.send(&backend, &[4], &metrics);
        assert_eq!(backend.claim_count(PID), 1);
    }

    #[test]
    fn test_zero_bytes_counts_as_failure() {
        let (backend, mut ep, metrics) = setup();
        backend.script_writes(PID, [MockWrite::Zero]);
        assert_eq!(ep.send(&backend, &[1], &metrics), SendOutcome::Failed);
        assert_eq!(ep.consecutive_failures(), 1);
        assert_eq!(metrics.transfer_failures.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_tenth_failure_cycles_before_eleventh_attempt() {
        let (backend, mut ep, metrics) = setup();
        backend.script_writes(PID, [MockWrite::Fail(rusb::Error::Io); 10]);

        for i in 1..=9u32 {
            assert_eq!(ep.send(&backend, &[i as u8], &metrics), SendOutcome::Failed);
            assert_eq!(ep.consecutive_failures(), i);
        }
        assert_eq!(backend.release_count(PID), 0);

        assert_eq!(ep.send(&backend, &[10], &metrics), SendOutcome::Failed);
        assert_eq!(backend.release_count(PID), 1);
        assert_eq!(backend.claim_count(PID), 2);
        assert_eq!(ep.consecutive_failures(), 0);
        assert!(ep.is_open());

        assert_eq!(ep.send(&backend, &[11], &metrics), SendOutcome::Sent(1));
        assert_eq!(metrics.reconnects.load(Ordering::Relaxed), 1);

        // 第 10 次写入之后、第 11 次写入之前恰好一次 Release + Claim
        let events = backend.events();
        let writes: Vec<usize> = events
            .iter()
            .enumerate()
            .filter(|(_, e)| matches!(e, MockEvent::Write { .. }))
            .map(|(i, _)| i)
            .collect();
        let between = &events[writes[9] + 1..writes[10]];
        let releases = between.iter().filter(|e| matches!(e, MockEvent::Release { .. })).count();
        let claims = between.iter().filter(|e| matches!(e, MockEvent::Claim { .. })).count();
        assert_eq!((releases, claims), (1, 1));
    }

    #[test]
    fn test_success_resets_counter() {
        let (backend, mut ep, metrics) = setup();
        backend.script_writes(PID, [MockWrite::Fail(rusb::Error::Pipe); 9]);
        backend.script_writes(PID, [MockWrite::Complete]);
        backend.script_writes(PID, [MockWrite::Fail(rusb::Error::Pipe); 9]);

        for _ in 0..9 {
            ep.send(&backend, &[0], &metrics);
        }
        assert_eq!(ep.consecutive_failures(), 9);
        ep.send(&backend, &[0], &metrics);
        assert_eq!(ep.consecutive_failures(), 0);
        for _ in 0..9 {
            ep.send(&backend, &[0], &metrics);
        }
        assert_eq!(ep.consecutive_failures(), 9);
        assert_eq!(backend.release_count(PID), 0);
        assert_eq!(metrics.reconnects.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_missing_device_drops_send_and_counts() {
        let backend = MockBackend::new();
        let mut ep = Endpoint::<MockHandle>::new(Board::Bottom, VID, 0x5740, 10, Duration::ZERO);
        let metrics = BoardMetrics::default();

        assert_eq!(ep.send(&backend, &[1], &metrics), SendOutcome::Unresolved);
        assert!(!ep.is_open());
        assert_eq!(ep.consecutive_failures(), 1);
        assert_eq!(metrics.resolution_failures.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.transfer_failures.load(Ordering::Relaxed), 0);

        // 设备插入后下一次发送会重新解析
        backend.add_device(MockBackend::board_info(VID, 0x5740));
        assert_eq!(ep.send(&backend, &[1], &metrics), SendOutcome::Sent(1));
        assert_eq!(ep.consecutive_failures(), 0);
    }

    #[test]
    fn test_reopen_failure_leaves_endpoint_closed() {
        let (backend, mut ep, metrics) = setup();
        backend.script_writes(PID, [MockWrite::Fail(rusb::Error::NoDevice); 10]);
        ep.send(&backend, &[0], &metrics);

        backend.remove_device(PID);
        for _ in 0..9 {
            ep.send(&backend, &[0], &metrics);
        }
        assert!(!ep.is_open());
        assert!(!metrics.is_open.load(Ordering::Relaxed));
        assert_eq!(metrics.reconnects.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_empty_send_is_skipped() {
        let (backend, mut ep, metrics) = setup();
        for _ in 0..10 {
            assert_eq!(ep.send(&backend, &[], &metrics), SendOutcome::Skipped);
        }
        assert!(!ep.is_open());
        assert_eq!(ep.consecutive_failures(), 0);
        assert_eq!(backend.enumerate_count(), 0);
        assert_eq!(metrics.transfer_failures.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_zero_length_write_is_reported_as_error() {
        let (backend, mut ep, metrics) = setup();
        backend.script_writes(PID, [MockWrite::Zero]);
        assert_eq!(ep.send(&backend, &[1, 2], &metrics), SendOutcome::Failed);
        assert_eq!(metrics.transfers_ok.load(Ordering::Relaxed), 0);
        assert_eq!(metrics.bytes_written.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_counter_saturates_without_reconnect() {
        let backend = MockBackend::new();
        let mut ep = Endpoint::<MockHandle>::new(Board::Head, VID, PID, 0, Duration::ZERO);
        let metrics = BoardMetrics::default();
        ep.consecutive_failures = u32::MAX - 1;

        ep.send(&backend, &[1], &metrics);
        ep.send(&backend, &[1], &metrics);
        assert_eq!(ep.consecutive_failures(), u32::MAX);
        assert_eq!(metrics.reconnects.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_close_releases_interface() {
        let (backend, mut ep, metrics) = setup();
        ep.send(&backend, &[1], &metrics);
        ep.close(&metrics);
        ep.close(&metrics);
        assert!(!ep.is_open());
        assert_eq!(backend.release_count(PID), 1);
    }
}
