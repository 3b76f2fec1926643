//! One-shot channel for single-use value transfer between threads
//!
//! Carries exactly one value from a [`Sender`] to a [`Receiver`]. The value lives directly in the
//! shared control block (`UnsafeCell<MaybeUninit<T>>`), and a single atomic state word is the
//! only synchronization point:
//!
//! 一次性通道，用于线程间的单次值传递
//!
//! 值直接存放在共享控制块中（`UnsafeCell<MaybeUninit<T>>`），单个原子状态字是唯一的同步点：
//!
//! ```text
//! NOT_SENT ──send──▶ SENT ──recv──▶ RECEIVED
//!     │
//!     └──sender dropped──▶ DISCONNECTED
//! ```
//!
//! Every transition is one-way and happens at most once. The sender publishes `SENT` with
//! `Release` after writing the slot; the receiver observes it with `Acquire` before moving the
//! value out.
//!
//! 每个状态转换都是单向的且最多发生一次。
//!
//! # Examples
//!
//! ```
//! use lite_channel::oneshot;
//! use std::thread;
//!
//! let (tx, rx) = oneshot::channel::<String>();
//!
//! thread::spawn(move || {
//!     tx.send("Hello, World!".to_string()).unwrap();
//! });
//!
//! assert_eq!(rx.recv().unwrap(), "Hello, World!");
//! ```
use crate::arc_ptr::ArcPtr;
use crate::shim::atomic::{AtomicU8, Ordering};
use crate::shim::cell::UnsafeCell;
use crate::status::Status;
use crate::strategy::{BusyLoop, WaitStrategy};
use crate::trace::{debug, trace};
use crossbeam_utils::CachePadded;
use std::cell::Cell;
use std::fmt;
use std::mem::MaybeUninit;

// States for the value slot
const NOT_SENT: u8 = 0; // Slot uninitialized
const SENT: u8 = 1; // Slot holds the value
const RECEIVED: u8 = 2; // Value moved out, slot uninitialized again
const DISCONNECTED: u8 = 3; // Sender dropped without sending

pub mod error {
    //! One-shot error types.
    //!
    //! 一次性通道错误类型。

    use crate::status::Status;
    use std::fmt;

    /// Error returned by a second `send`: the channel has already carried its value.
    /// Hands the rejected value back.
    ///
    /// 第二次 `send` 返回的错误：通道已传递过值。返还被拒绝的值。
    #[derive(Clone, Copy, PartialEq, Eq)]
    pub struct SendError<T>(pub T);

    impl<T> SendError<T> {
        #[inline]
        pub fn into_inner(self) -> T {
            self.0
        }

        #[inline]
        pub fn status(&self) -> Status {
            Status::SenderClosed
        }
    }

    impl<T> fmt::Debug for SendError<T> {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("SendError(..)")
        }
    }

    impl<T> fmt::Display for SendError<T> {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "value already sent")
        }
    }

    impl<T> std::error::Error for SendError<T> {}

    /// Error returned from `try_recv`
    ///
    /// `try_recv` 返回的错误
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum TryRecvError {
        /// No value sent yet
        ///
        /// 尚未发送值
        Empty,
        /// The value has already been received
        ///
        /// 值已被接收
        ReceiverClosed,
        /// The sender was dropped without sending a value
        ///
        /// 发送器在发送值之前被丢弃
        Closed,
    }

    impl TryRecvError {
        #[inline]
        pub fn status(&self) -> Status {
            match self {
                TryRecvError::Empty => Status::ChannelEmpty,
                TryRecvError::ReceiverClosed => Status::ReceiverClosed,
                TryRecvError::Closed => Status::ChannelClosed,
            }
        }
    }

    impl fmt::Display for TryRecvError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                TryRecvError::Empty => write!(f, "channel empty"),
                TryRecvError::ReceiverClosed => write!(f, "value already received"),
                TryRecvError::Closed => write!(f, "channel closed"),
            }
        }
    }

    impl std::error::Error for TryRecvError {}

    /// Error returned from the blocking `recv`
    ///
    /// 阻塞 `recv` 返回的错误
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum RecvError {
        /// The value has already been received by an earlier call
        ///
        /// 值已被之前的调用接收
        ReceiverClosed,
        /// The sender was dropped without sending a value
        ///
        /// 发送器在发送值之前被丢弃
        Closed,
    }

    impl RecvError {
        #[inline]
        pub fn status(&self) -> Status {
            match self {
                RecvError::ReceiverClosed => Status::ReceiverClosed,
                RecvError::Closed => Status::ChannelClosed,
            }
        }
    }

    impl fmt::Display for RecvError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                RecvError::ReceiverClosed => write!(f, "value already received"),
                RecvError::Closed => write!(f, "channel closed"),
            }
        }
    }

    impl std::error::Error for RecvError {}
}

pub use self::error::{RecvError, SendError, TryRecvError};

/// Create a one-shot channel with the [`BusyLoop`] wait strategy
///
/// 使用 [`BusyLoop`] 等待策略创建一次性通道
#[inline]
pub fn channel<T>() -> (Sender<T>, Receiver<T>) {
    channel_with::<T, BusyLoop>()
}

/// Create a one-shot channel with an explicit wait strategy
///
/// 使用指定等待策略创建一次性通道
///
/// # Examples
///
/// ```
/// use lite_channel::oneshot;
/// use lite_channel::strategy::AtomicWait;
/// use std::thread;
///
/// let (tx, rx) = oneshot::channel_with::<u64, AtomicWait>();
/// let handle = thread::spawn(move || rx.recv());
///
/// tx.send(7).unwrap();
/// assert_eq!(handle.join().unwrap(), Ok(7));
/// ```
pub fn channel_with<T, W: WaitStrategy>() -> (Sender<T, W>, Receiver<T, W>) {
    let inner = ArcPtr::new(Inner::<T, W> {
        state: CachePadded::new(AtomicU8::new(NOT_SENT)),
        value: UnsafeCell::new(MaybeUninit::uninit()),
        waiter: W::Waiter::default(),
    });

    let sender = Sender {
        inner: inner.clone(),
        sent: Cell::new(false),
    };

    let receiver = Receiver {
        inner,
        received: Cell::new(false),
    };

    (sender, receiver)
}

struct Inner<T, W: WaitStrategy> {
    state: CachePadded<AtomicU8>,
    /// Initialized exactly while `state == SENT`
    value: UnsafeCell<MaybeUninit<T>>,
    /// The receiver blocks here waiting for the value
    waiter: W::Waiter,
}

// SAFETY: the slot is written only by the sender before it publishes SENT, and read only by the
// receiver after it observes SENT, so the two never touch it concurrently
unsafe impl<T: Send, W: WaitStrategy> Sync for Inner<T, W> {}

impl<T, W: WaitStrategy> Inner<T, W> {
    #[inline]
    fn state(&self) -> u8 {
        self.state.load(Ordering::Acquire)
    }
}

impl<T, W: WaitStrategy> Drop for Inner<T, W> {
    fn drop(&mut self) {
        // Both endpoints are gone and ArcPtr's acquire fence made their writes visible
        if self.state.load(Ordering::Relaxed) == SENT {
            // SAFETY: SENT means the slot is initialized and nobody received it
            self.value.with_mut(|slot| unsafe { (*slot).assume_init_drop() });
            trace!("oneshot value dropped unreceived");
        }
    }
}

/// Sender for one-shot value transfer
///
/// Not `Clone`, and `!Sync`; move it to the thread that produces the value.
///
/// 一次性值传递的发送器，不可克隆且为 `!Sync`。
pub struct Sender<T, W: WaitStrategy = BusyLoop> {
    inner: ArcPtr<Inner<T, W>>,
    /// Only this sender moves the state out of NOT_SENT, so a local flag is exact
    sent: Cell<bool>,
}

impl<T, W: WaitStrategy> Sender<T, W> {
    /// Send the value
    ///
    /// Succeeds only on the first call. Later calls return the value back inside
    /// [`SendError`] (status [`Status::SenderClosed`]) without touching the stored one.
    ///
    /// 发送值
    ///
    /// 仅第一次调用成功。之后的调用通过 [`SendError`] 返还值，不会修改已存储的值。
    ///
    /// # Examples
    ///
    /// ```
    /// use lite_channel::oneshot;
    ///
    /// let (tx, rx) = oneshot::channel::<i32>();
    /// assert!(tx.send(1).is_ok());
    /// assert_eq!(tx.send(2).unwrap_err().0, 2);
    /// assert_eq!(rx.try_recv(), Ok(1));
    /// ```
    pub fn send(&self, value: T) -> Result<(), SendError<T>> {
        if self.sent.get() {
            return Err(SendError(value));
        }

        // SAFETY: state is NOT_SENT, so the receiver does not touch the slot yet
        self.inner.value.with_mut(|slot| unsafe {
            (*slot).write(value);
        });
        self.inner.state.store(SENT, Ordering::Release);
        self.sent.set(true);

        W::notify(&self.inner.waiter);
        Ok(())
    }

    /// Whether the value has been sent, after which every `send` fails
    ///
    /// 值是否已发送，之后所有 `send` 都会失败
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.sent.get()
    }
}

impl<T, W: WaitStrategy> Drop for Sender<T, W> {
    fn drop(&mut self) {
        if !self.sent.get() {
            self.inner.state.store(DISCONNECTED, Ordering::Release);
            W::notify(&self.inner.waiter);
            debug!("oneshot sender dropped without sending");
        }
    }
}

impl<T, W: WaitStrategy> fmt::Debug for Sender<T, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sender")
            .field("sent", &self.sent.get())
            .finish()
    }
}

/// Receiver for one-shot value transfer
///
/// 一次性值传递的接收器
pub struct Receiver<T, W: WaitStrategy = BusyLoop> {
    inner: ArcPtr<Inner<T, W>>,
    received: Cell<bool>,
}

impl<T, W: WaitStrategy> Receiver<T, W> {
    /// Try to receive the value without blocking
    ///
    /// # Errors
    /// - `TryRecvError::Empty` if nothing has been sent yet
    /// - `TryRecvError::ReceiverClosed` if the value was already received
    /// - `TryRecvError::Closed` if the sender was dropped without sending
    ///
    /// 尝试非阻塞地接收值
    ///
    /// # 错误
    /// - 尚未发送时返回 `TryRecvError::Empty`
    /// - 值已被接收时返回 `TryRecvError::ReceiverClosed`
    /// - 发送器未发送即被丢弃时返回 `TryRecvError::Closed`
    pub fn try_recv(&self) -> Result<T, TryRecvError> {
        if self.received.get() {
            return Err(TryRecvError::ReceiverClosed);
        }

        match self.inner.state() {
            NOT_SENT => Err(TryRecvError::Empty),
            DISCONNECTED => Err(TryRecvError::Closed),
            SENT => {
                // SAFETY: Acquire on SENT makes the sender's write visible, and only this
                // receiver moves the value out
                let value = self
                    .inner
                    .value
                    .with(|slot| unsafe { (*slot).assume_init_read() });
                self.inner.state.store(RECEIVED, Ordering::Release);
                self.received.set(true);
                Ok(value)
            }
            _ => Err(TryRecvError::ReceiverClosed),
        }
    }

    /// Status-based receive: move the value into `out`
    ///
    /// `out` is left untouched unless [`Status::Success`] is returned.
    ///
    /// 基于状态码的接收：将值移动到 `out`，仅在返回 `Success` 时修改 `out`。
    #[inline]
    pub fn try_recv_into(&self, out: &mut T) -> Status {
        match self.try_recv() {
            Ok(value) => {
                *out = value;
                Status::Success
            }
            Err(err) => err.status(),
        }
    }

    /// Receive the value, waiting until it is sent
    ///
    /// A call after the value has already been received returns
    /// [`RecvError::ReceiverClosed`] immediately instead of waiting for a value that can never
    /// arrive. A sender dropped without sending yields [`RecvError::Closed`].
    ///
    /// 接收值，等待直到其被发送
    ///
    /// 值已被接收后再次调用会立即返回 [`RecvError::ReceiverClosed`]，而不是永远等待。
    /// 发送器未发送即被丢弃时返回 [`RecvError::Closed`]。
    pub fn recv(&self) -> Result<T, RecvError> {
        loop {
            match self.try_recv() {
                Ok(value) => return Ok(value),
                Err(TryRecvError::ReceiverClosed) => return Err(RecvError::ReceiverClosed),
                Err(TryRecvError::Closed) => return Err(RecvError::Closed),
                Err(TryRecvError::Empty) => {
                    W::wait(&self.inner.waiter, || self.inner.state() != NOT_SENT);
                }
            }
        }
    }

    /// Whether no value can be received any more: it was already received, or the sender was
    /// dropped without sending
    ///
    /// 是否再也无法接收值：值已被接收，或发送器未发送即被丢弃
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.received.get() || self.inner.state() == DISCONNECTED
    }
}

impl<T, W: WaitStrategy> fmt::Debug for Receiver<T, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Receiver")
            .field("received", &self.received.get())
            .finish()
    }
}
