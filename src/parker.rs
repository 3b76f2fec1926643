//! Atomic storage for a parked thread handle
//!
//! Same register/take state machine as an async `AtomicWaker`, but the stored handle is a
//! `std::thread::Thread` and waking means `unpark`. Uses `UnsafeCell<Option<Thread>>` plus an
//! atomic state word so registration and wake-up never take a lock.
//!
//! 存放被 park 线程句柄的原子存储
//!
//! 与异步 `AtomicWaker` 使用相同的注册/取出状态机，但存放的是 `Thread`，唤醒即 `unpark`。
//! 使用 `UnsafeCell<Option<Thread>>` + 原子状态字，注册和唤醒都无需加锁。

use crate::shim::atomic::{AtomicUsize, Ordering};
use crate::shim::cell::UnsafeCell;
use crate::shim::thread::{yield_now, Thread};

// Registration states
const WAITING: usize = 0;
const REGISTERING: usize = 0b01;
const WAKING: usize = 0b10;

/// Atomic thread-handle slot with state machine synchronization
///
/// 带有状态机同步的原子线程句柄槽
pub(crate) struct AtomicParker {
    state: AtomicUsize,
    thread: UnsafeCell<Option<Thread>>,
}

// SAFETY: access to `thread` is serialized by the REGISTERING / WAKING lock bits
unsafe impl Sync for AtomicParker {}
unsafe impl Send for AtomicParker {}

impl AtomicParker {
    #[inline]
    pub(crate) fn new() -> Self {
        Self {
            state: AtomicUsize::new(WAITING),
            thread: UnsafeCell::new(None),
        }
    }

    /// Register the thread to unpark on the next `unpark`
    ///
    /// If a concurrent `unpark` races with the registration, the newly registered thread is
    /// unparked immediately so its next `park` returns. If a `take` is in flight, waits for it
    /// to finish and then registers, so the caller's next `park` actually blocks.
    ///
    /// 注册下一次 `unpark` 要唤醒的线程
    ///
    /// 如果注册期间发生并发唤醒，新注册的线程会立即被 unpark。
    /// 如果有正在进行的 `take`，先等待其完成再注册，保证调用者随后的 `park` 真正阻塞。
    pub(crate) fn register(&self, thread: Thread) {
        loop {
            match self.state.compare_exchange(
                WAITING,
                REGISTERING,
                Ordering::Acquire,
                Ordering::Acquire,
            ) {
                Ok(_) => break,
                Err(WAKING) => {
                    // A take is in flight and clears WAKING within a few instructions
                    yield_now();
                }
                Err(_) => {
                    // Concurrent register: a single waiter never gets here
                    return;
                }
            }
        }

        // SAFETY: REGISTERING gives us exclusive access to the slot
        let old = self.thread.with_mut(|t| unsafe { (*t).replace(thread) });

        match self
            .state
            .compare_exchange(REGISTERING, WAITING, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => drop(old),
            Err(_) => {
                // A wake arrived while we held the slot: state is REGISTERING | WAKING
                // SAFETY: still exclusive, the waker backed off
                let pending = self.thread.with_mut(|t| unsafe { (*t).take() });
                self.state.store(WAITING, Ordering::Release);

                drop(old);
                if let Some(thread) = pending {
                    thread.unpark();
                }
            }
        }
    }

    /// Take the registered thread out, if any
    ///
    /// 取出已注册的线程（如果有）
    pub(crate) fn take(&self) -> Option<Thread> {
        match self.state.fetch_or(WAKING, Ordering::AcqRel) {
            WAITING => {
                // SAFETY: WAKING gives us exclusive access to the slot
                let thread = self.thread.with_mut(|t| unsafe { (*t).take() });
                self.state.store(WAITING, Ordering::Release);
                thread
            }
            _ => None,
        }
    }

    /// Unpark the registered thread if any
    ///
    /// 唤醒已注册的线程（如果有）
    #[inline]
    pub(crate) fn unpark(&self) {
        if let Some(thread) = self.take() {
            thread.unpark();
        }
    }
}

impl std::fmt::Debug for AtomicParker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AtomicParker").finish()
    }
}
