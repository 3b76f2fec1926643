//! Compile-time strategies for channel behavior.
//!
//! 通道行为的编译期策略。
//!
//! Channels take two type parameters:
//!
//! - an [`OverflowStrategy`] deciding what a sender does when the ring is full
//!   ([`WaitOnFull`] or [`OverwriteOnFull`]);
//! - a [`WaitStrategy`] deciding how blocking `send`/`recv` pass the time between attempts
//!   ([`BusyLoop`], [`Yield`] or [`AtomicWait`]).
//!
//! Both are zero-sized markers, so the selected behavior is monomorphized into the channel and
//! the other branches cost nothing.
//!
//! 两者都是零大小标记类型，所选行为会被单态化进通道，其余分支没有任何开销。
//!
//! ```
//! use lite_channel::spsc;
//! use lite_channel::strategy::{AtomicWait, OverwriteOnFull};
//!
//! let (tx, rx) = spsc::channel_with::<u64, OverwriteOnFull, AtomicWait>(4);
//! for i in 0..5 {
//!     tx.send(i).unwrap();
//! }
//! assert_eq!(rx.drain().collect::<Vec<_>>(), vec![2, 3, 4]);
//! ```

use crate::notify::SingleWaiterNotify;
use crate::shim::{hint, thread};
use std::fmt;

/// Policy for a sender facing a full ring.
///
/// 发送者遇到满缓冲区时的策略。
pub trait OverflowStrategy: Send + Sync + 'static {
    /// Whether a full ring drops its oldest element to make room.
    const OVERWRITE: bool;
}

/// `try_send` fails with `Full` when the ring is full; blocking `send` retries. The default.
///
/// 缓冲区满时 `try_send` 返回 `Full`，阻塞的 `send` 会重试。默认策略。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WaitOnFull;

impl OverflowStrategy for WaitOnFull {
    const OVERWRITE: bool = false;
}

/// The sender discards the oldest unread element instead of failing.
///
/// A receiver racing with the discard gets
/// [`SkipDueToOverwrite`](crate::spsc::TryRecvError::SkipDueToOverwrite) rather than stale data.
///
/// 发送者丢弃最旧的未读元素而不是失败。与丢弃竞争的接收者会得到 `SkipDueToOverwrite`。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OverwriteOnFull;

impl OverflowStrategy for OverwriteOnFull {
    const OVERWRITE: bool = true;
}

/// Policy for passing time inside blocking `send`/`recv`.
///
/// 阻塞 `send`/`recv` 内部的等待策略。
///
/// Each channel direction owns one [`Waiter`](WaitStrategy::Waiter). The blocked side calls
/// [`wait`](WaitStrategy::wait); the side that makes progress (publishes an element, frees a
/// slot, drops its endpoint) calls [`notify`](WaitStrategy::notify) afterwards.
pub trait WaitStrategy: Send + Sync + 'static {
    /// Per-direction state shared through the channel interior.
    type Waiter: Default + Send + Sync + fmt::Debug;

    /// Pause until `ready` may hold.
    ///
    /// Spinning strategies pause once and return, leaving the retry to the caller's loop.
    /// Blocking strategies return only after `ready` returned true.
    fn wait<F>(waiter: &Self::Waiter, ready: F)
    where
        F: FnMut() -> bool;

    /// Wake a thread blocked in [`wait`](WaitStrategy::wait) on the same waiter.
    fn notify(waiter: &Self::Waiter);
}

/// Tight spin with a compiler-only barrier between attempts.
///
/// Lowest latency, a full core of CPU while waiting.
///
/// 尝试之间只有编译器屏障的紧密自旋。延迟最低，等待时占满一个核心。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BusyLoop;

impl WaitStrategy for BusyLoop {
    type Waiter = ();

    #[inline(always)]
    fn wait<F>(_waiter: &(), _ready: F)
    where
        F: FnMut() -> bool,
    {
        hint::compiler_barrier();
    }

    #[inline(always)]
    fn notify(_waiter: &()) {}
}

/// Spin, yielding the processor to the scheduler between attempts.
///
/// 自旋，但在尝试之间让出处理器。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Yield;

impl WaitStrategy for Yield {
    type Waiter = ();

    #[inline]
    fn wait<F>(_waiter: &(), _ready: F)
    where
        F: FnMut() -> bool,
    {
        thread::yield_now();
    }

    #[inline(always)]
    fn notify(_waiter: &()) {}
}

/// Park the OS thread until the peer publishes progress.
///
/// Lowest CPU use, highest wake-up latency. Every publish pays one atomic swap to notify.
///
/// 停放操作系统线程直到对端发布进展。CPU 占用最低，唤醒延迟最高。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AtomicWait;

impl WaitStrategy for AtomicWait {
    type Waiter = SingleWaiterNotify;

    #[inline]
    fn wait<F>(waiter: &SingleWaiterNotify, ready: F)
    where
        F: FnMut() -> bool,
    {
        waiter.wait_until(ready);
    }

    #[inline]
    fn notify(waiter: &SingleWaiterNotify) {
        waiter.notify_one();
    }
}
