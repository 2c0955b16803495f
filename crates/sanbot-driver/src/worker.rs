//! USB 工作线程
//!
//! 唯一执行 USB 传输的线程。按 FIFO 顺序出队消息，根据目标（或路由标签）
//! 写入一个或两个端点。

use crate::config::ManagerConfig;
use crate::endpoint::{Board, Endpoint};
use crate::metrics::TransportMetrics;
use crate::queue::{CloseOnExit, Message, SendQueue, Target};
use sanbot_protocol::{RoutingTag, split_routing_tag};
use sanbot_usb::UsbBackend;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use tracing::{debug, trace};

/// 工作线程状态：后端和两个端点
///
/// 字段声明顺序保证端点先于后端（USB 上下文）被销毁。
pub(crate) struct Worker<B: UsbBackend> {
    head: Endpoint<B::Handle>,
    bottom: Endpoint<B::Handle>,
    backend: B,
    queue: Arc<SendQueue>,
    metrics: Arc<TransportMetrics>,
}

impl<B: UsbBackend> Worker<B> {
    pub(crate) fn new(
        backend: B,
        config: &ManagerConfig,
        queue: Arc<SendQueue>,
        metrics: Arc<TransportMetrics>,
    ) -> Self {
        let endpoint = |board, product_id| {
            Endpoint::new(
                board,
                config.vendor_id,
                product_id,
                config.reconnect_threshold,
                config.transfer_timeout,
            )
        };
        Self {
            head: endpoint(Board::Head, config.head_product_id),
            bottom: endpoint(Board::Bottom, config.bottom_product_id),
            backend,
            queue,
            metrics,
        }
    }

    /// 主循环；队列关闭后返回自身，由调用方负责关闭端点
    pub(crate) fn run(mut self) -> Self {
        let queue = Arc::clone(&self.queue);
        let _close = CloseOnExit(&queue);

        while let Some(message) = queue.pop() {
            self.dispatch(message);
            self.metrics.dispatched.fetch_add(1, Ordering::Relaxed);
            queue.complete();
        }

        debug!("USB worker loop exited");
        self
    }

    fn dispatch(&mut self, message: Message) {
        match message.target {
            Target::Head => self.send(Board::Head, &message.bytes),
            Target::Bottom => self.send(Board::Bottom, &message.bytes),
            Target::Point => self.route(&message.bytes),
        }
    }

    /// 解析路由标签；非法标签静默丢弃，不计为设备失败
    fn route(&mut self, routed: &[u8]) {
        let Some((tag, frame)) = split_routing_tag(routed) else {
            trace!("Dropping routed buffer of {} bytes: too short", routed.len());
            self.metrics.malformed_tags.fetch_add(1, Ordering::Relaxed);
            return;
        };

        let Ok(tag) = RoutingTag::try_from(tag) else {
            trace!("Dropping routed buffer with unknown tag 0x{:02x}", tag);
            self.metrics.malformed_tags.fetch_add(1, Ordering::Relaxed);
            return;
        };

        if tag.targets_head() {
            self.send(Board::Head, frame);
        }
        if tag.targets_bottom() {
            self.send(Board::Bottom, frame);
        }
    }

    fn send(&mut self, board: Board, data: &[u8]) {
        let (endpoint, metrics) = match board {
            Board::Head => (&mut self.head, &self.metrics.head),
            Board::Bottom => (&mut self.bottom, &self.metrics.bottom),
        };
        endpoint.send(&self.backend, data, metrics);
    }

    /// 释放并关闭两个端点，然后销毁后端
    pub(crate) fn shutdown(mut self) {
        self.head.close(&self.metrics.head);
        self.bottom.close(&self.metrics.bottom);
        drop(self);
    }
}
