//! Lightweight single-waiter blocking notification primitive
//!
//! Backs the [`AtomicWait`](crate::strategy::AtomicWait) strategy: a thread blocks until some
//! condition on a shared atomic (a cursor or a state word) changes, and the thread that changes
//! it calls [`notify_one`](SingleWaiterNotify::notify_one) afterwards. Optimized for the SPSC
//! pattern where at most one thread waits at a time.
//!
//! 轻量级单等待者阻塞通知原语
//!
//! 为 [`AtomicWait`](crate::strategy::AtomicWait) 策略提供支持：线程阻塞直到某个共享原子量
//! （游标或状态字）发生变化，修改它的线程随后调用 `notify_one`。
//! 为每次最多只有一个线程等待的 SPSC 模式优化。

use crate::parker::AtomicParker;
use crate::shim::atomic::{AtomicU8, Ordering};
use crate::shim::thread;

// States for the notification
const EMPTY: u8 = 0; // No waiter, no notification
const WAITING: u8 = 1; // Waiter registered
const NOTIFIED: u8 = 2; // Notification sent

/// Single-waiter notifier that parks the waiting OS thread
///
/// 停放等待中的操作系统线程的单等待者通知器
pub struct SingleWaiterNotify {
    state: AtomicU8,
    parker: AtomicParker,
}

impl Default for SingleWaiterNotify {
    fn default() -> Self {
        Self::new()
    }
}

impl SingleWaiterNotify {
    /// Create a new single-waiter notifier
    ///
    /// 创建一个新的单等待者通知器
    #[inline]
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(EMPTY),
            parker: AtomicParker::new(),
        }
    }

    /// Wake the waiting thread (if any)
    ///
    /// Must be called after the change the waiter is checking for has been published. If
    /// called while nobody waits, the next wait re-checks its condition once before parking.
    ///
    /// 唤醒等待中的线程（如果有）
    ///
    /// 必须在等待者检查的变化发布之后调用。如果当前无人等待，下一次等待会在 park 前多检查一次条件。
    #[inline]
    pub fn notify_one(&self) {
        let prev_state = self.state.swap(NOTIFIED, Ordering::AcqRel);

        if prev_state == WAITING {
            self.parker.unpark();
        }
    }

    /// Block the current thread until `ready` returns true
    ///
    /// `ready` is evaluated before every park, so a notification that arrives at any point
    /// is never lost. Spurious wakeups only cost one extra evaluation.
    ///
    /// 阻塞当前线程直到 `ready` 返回 true
    ///
    /// 每次 park 之前都会检查 `ready`，因此任何时刻到达的通知都不会丢失。
    pub fn wait_until<F>(&self, mut ready: F)
    where
        F: FnMut() -> bool,
    {
        loop {
            if ready() {
                return;
            }

            // The handle must be in place before we advertise WAITING: a notifier that sees
            // WAITING takes whatever the parker holds.
            self.parker.register(thread::current());

            // Always a write, so the notifier's swap synchronizes with this registration even
            // when WAITING was left over from an earlier round.
            if self.state.swap(WAITING, Ordering::AcqRel) == NOTIFIED {
                // Consume it and re-check instead of parking
                let _ = self.state.compare_exchange(
                    WAITING,
                    EMPTY,
                    Ordering::AcqRel,
                    Ordering::Acquire,
                );
                continue;
            }

            if ready() {
                return;
            }

            thread::park();

            let _ =
                self.state
                    .compare_exchange(NOTIFIED, EMPTY, Ordering::AcqRel, Ordering::Acquire);
        }
    }
}

impl std::fmt::Debug for SingleWaiterNotify {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SingleWaiterNotify")
            .field("state", &self.state.load(Ordering::Relaxed))
            .finish()
    }
}
