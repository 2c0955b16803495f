//! 发送队列
//!
//! 无界、多生产者 / 单消费者的 FIFO 队列。生产者只在入队时持锁，工作线程
//! 只在出队时持锁；队列为空时工作线程在条件变量上挂起，直到有新消息或
//! 队列被关闭。

use bytes::Bytes;
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// 消息的发送目标
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Head,
    Bottom,
    /// 缓冲区最后一个字节是路由标签，出队时解析
    Point,
}

/// 队列中的一条消息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub target: Target,
    pub bytes: Bytes,
}

#[derive(Debug)]
struct QueueState {
    messages: VecDeque<Message>,
    /// 工作线程已取出消息但尚未处理完
    busy: bool,
    running: bool,
}

/// 发送队列
#[derive(Debug)]
pub struct SendQueue {
    state: Mutex<QueueState>,
    /// 有新消息或队列关闭
    available: Condvar,
    /// 队列已排空且工作线程空闲，或队列关闭
    idle: Condvar,
}

impl Default for SendQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl SendQueue {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState {
                messages: VecDeque::new(),
                busy: false,
                running: true,
            }),
            available: Condvar::new(),
            idle: Condvar::new(),
        }
    }

    /// 入队；队列已关闭时原样返回消息
    pub fn push(&self, message: Message) -> Result<(), Message> {
        let mut state = self.state.lock();
        if !state.running {
            return Err(message);
        }
        state.messages.push_back(message);
        drop(state);
        self.available.notify_one();
        Ok(())
    }

    /// 阻塞出队；队列关闭后返回 `None`，即使仍有未发送的消息
    pub fn pop(&self) -> Option<Message> {
        let mut state = self.state.lock();
        loop {
            if !state.running {
                return None;
            }
            if let Some(message) = state.messages.pop_front() {
                state.busy = true;
                return Some(message);
            }
            self.available.wait(&mut state);
        }
    }

    /// 工作线程处理完一条消息
    pub fn complete(&self) {
        let mut state = self.state.lock();
        state.busy = false;
        if state.messages.is_empty() {
            self.idle.notify_all();
        }
    }

    fn drained(state: &QueueState) -> bool {
        !state.running || (state.messages.is_empty() && !state.busy)
    }

    /// 阻塞直到队列排空且最后一条消息已经提交给设备（或队列关闭）
    pub fn wait_idle(&self) {
        let mut state = self.state.lock();
        while !Self::drained(&state) {
            self.idle.wait(&mut state);
        }
    }

    /// 带超时的 `wait_idle`，返回是否已排空
    pub fn wait_idle_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock();
        while !Self::drained(&state) {
            if self.idle.wait_until(&mut state, deadline).timed_out() {
                return Self::drained(&state);
            }
        }
        true
    }

    /// 关闭队列并唤醒所有等待者
    pub fn close(&self) {
        let mut state = self.state.lock();
        state.running = false;
        drop(state);
        self.available.notify_all();
        self.idle.notify_all();
    }

    pub fn is_running(&self) -> bool {
        self.state.lock().running
    }

    /// 尚未出队的消息数
    pub fn pending(&self) -> usize {
        self.state.lock().messages.len()
    }
}

/// 工作线程退出（包括 panic）时关闭队列，避免 `wait_idle` 永久阻塞
pub(crate) struct CloseOnExit<'a>(pub(crate) &'a SendQueue);

impl Drop for CloseOnExit<'_> {
    fn drop(&mut self) {
        self.0.close();
    }
}
