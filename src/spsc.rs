//! Bounded lock-free SPSC (Single Producer Single Consumer) ring channel
//!
//! A fixed-size circular buffer whose size is rounded up to a power of two, so wraparound is a
//! bitmask instead of a division. One slot is always kept free to tell "full" from "empty"
//! using only the two cursors, so a ring of size `n` holds `n - 1` elements.
//!
//! 有界无锁 SPSC（单生产者单消费者）环形通道
//!
//! 固定大小的环形缓冲区，大小向上取整到 2 的幂，回绕只需位掩码而无需除法。
//! 始终保留一个空槽以便仅凭两个游标区分"满"和"空"，因此大小为 `n` 的环可容纳 `n - 1` 个元素。
//!
//! # Memory ordering
//!
//! Each side loads its own cursor `Relaxed` (nobody else writes it) and publishes it with
//! `Release` after touching the slot. Each side also keeps a private copy of the *other* side's
//! cursor and only re-reads the shared atomic (with `Acquire`) when that copy says the ring is
//! full (sender) or empty (receiver). Cross-core traffic is paid roughly once per wraparound
//! instead of once per element.
//!
//! # 安全性说明 (Safety Notes)
//!
//! 这种 relaxed/release/acquire 组合只在每个游标恰好由一个线程写入时才成立：
//!
//! 1. **单一所有权**：`Sender` 和 `Receiver` 都不实现 `Clone`
//! 2. **禁止共享引用跨线程**：端点内部持有 `Cell` 缓存，因此是 `!Sync`，无法通过 `&Sender` 在多个线程同时发送
//! 3. **类型系统保证**：以上两点由编译器检查，而不是运行时检查
//!
//! # Safety Guarantees
//!
//! The relaxed/release/acquire protocol is only sound because each cursor has exactly one
//! writer:
//!
//! 1. **Single Ownership**: neither `Sender` nor `Receiver` implements `Clone`
//! 2. **No shared endpoints**: endpoints hold their peer-cursor cache in a `Cell`, which makes
//!    them `!Sync`; two threads can never call `try_send` through one `&Sender`
//! 3. **Type System Enforcement**: both are checked by the compiler, not at runtime
//!
//! The one exception is [`OverwriteOnFull`](crate::strategy::OverwriteOnFull): there the
//! sender may advance the receive cursor to discard the oldest element. Both sides then use
//! compare-and-swap on the receive cursor, and the receiver marks the slot it is moving out
//! so the sender never drops it underneath.
//!
//! # Examples
//!
//! ```
//! use lite_channel::spsc;
//! use std::thread;
//!
//! let (tx, rx) = spsc::channel::<u32>(16);
//!
//! let producer = thread::spawn(move || {
//!     for i in 0..100 {
//!         tx.send(i).unwrap();
//!     }
//! });
//!
//! let mut sum = 0;
//! while let Ok(value) = rx.recv() {
//!     sum += value;
//! }
//! producer.join().unwrap();
//! assert_eq!(sum, 4950);
//! ```
use crate::arc_ptr::ArcPtr;
use crate::shim::atomic::{AtomicBool, AtomicUsize, Ordering};
use crate::shim::cell::UnsafeCell;
use crate::shim::hint;
use crate::status::Status;
use crate::strategy::{BusyLoop, OverflowStrategy, WaitOnFull, WaitStrategy};
use crate::trace::{debug, trace};
use crossbeam_utils::CachePadded;
use std::cell::Cell;
use std::fmt;
use std::marker::PhantomData;
use std::mem::MaybeUninit;

/// Set on the receive cursor while the receiver moves an element out (overwrite mode only).
const READING: usize = 1 << (usize::BITS - 1);

/// Cursors count up forever and wrap at 2^63; the slot index is `cursor & mask`.
const CURSOR_MASK: usize = !READING;

/// Largest ring the cursor arithmetic can represent.
const MAX_RING_SIZE: usize = READING >> 1;

#[inline(always)]
fn advance(cursor: usize) -> usize {
    cursor.wrapping_add(1) & CURSOR_MASK
}

#[inline(always)]
fn distance(from: usize, to: usize) -> usize {
    to.wrapping_sub(from) & CURSOR_MASK
}

/// Ring size for a requested capacity: next power of two, never below 2 so that at least one
/// element fits.
fn ring_size_for(capacity: usize) -> usize {
    let size = capacity
        .max(2)
        .checked_next_power_of_two()
        .filter(|&size| size <= MAX_RING_SIZE);

    match size {
        Some(size) => size,
        None => panic!("spsc capacity overflow: {capacity}"),
    }
}

/// SPSC channel creation function with the default strategies
///
/// Uses [`WaitOnFull`] and [`BusyLoop`]. The ring size is `capacity` rounded up to the next
/// power of two; usable capacity is one less.
///
/// # Panics
/// If the rounded ring size does not fit the cursor range (more than 2^62 slots).
///
/// 使用默认策略创建 SPSC 通道
///
/// 使用 [`WaitOnFull`] 和 [`BusyLoop`]。环大小为 `capacity` 向上取整到 2 的幂，可用容量少一个。
///
/// # Examples
///
/// ```
/// use lite_channel::spsc;
///
/// let (tx, rx) = spsc::channel::<i32>(5);
/// assert_eq!(tx.capacity(), 7);
///
/// tx.try_send(42).unwrap();
/// assert_eq!(rx.try_recv(), Ok(42));
/// ```
#[inline]
pub fn channel<T>(capacity: usize) -> (Sender<T>, Receiver<T>) {
    channel_with::<T, WaitOnFull, BusyLoop>(capacity)
}

/// SPSC channel creation function with explicit strategies
///
/// # Type Parameters
/// - `T`: message type; needs neither `Default` nor `Clone`
/// - `O`: what the sender does when the ring is full
/// - `W`: how blocking `send`/`recv` wait between attempts
///
/// 使用指定策略创建 SPSC 通道
///
/// # 类型参数
/// - `T`: 消息类型，不要求 `Default` 或 `Clone`
/// - `O`: 缓冲区满时发送者的行为
/// - `W`: 阻塞 `send`/`recv` 在两次尝试之间如何等待
pub fn channel_with<T, O, W>(capacity: usize) -> (Sender<T, O, W>, Receiver<T, O, W>)
where
    O: OverflowStrategy,
    W: WaitStrategy,
{
    let ring_size = ring_size_for(capacity);

    let buffer = (0..ring_size)
        .map(|_| UnsafeCell::new(MaybeUninit::uninit()))
        .collect::<Box<[_]>>();

    let inner = ArcPtr::new(Inner::<T, W> {
        buffer,
        mask: ring_size - 1,
        send_cursor: CachePadded::new(AtomicUsize::new(0)),
        rcv_cursor: CachePadded::new(AtomicUsize::new(0)),
        closed: CachePadded::new(AtomicBool::new(false)),
        recv_waiter: W::Waiter::default(),
        send_waiter: W::Waiter::default(),
    });

    debug!(
        requested = capacity,
        ring_size,
        overwrite = O::OVERWRITE,
        "spsc channel created"
    );

    let sender = Sender {
        inner: inner.clone(),
        rcv_cache: Cell::new(0),
        _overflow: PhantomData,
    };

    let receiver = Receiver {
        inner,
        send_cache: Cell::new(0),
        _overflow: PhantomData,
    };

    (sender, receiver)
}

/// Shared interior of an SPSC channel
///
/// Owned jointly by the two endpoints through an [`ArcPtr`]; whoever drops last frees it.
///
/// SPSC 通道的共享内部状态，由两端通过 [`ArcPtr`] 共同持有，最后一个释放者负责销毁。
struct Inner<T, W: WaitStrategy> {
    /// Slots for cursors in `[rcv_cursor, send_cursor)` are initialized, all others are not.
    buffer: Box<[UnsafeCell<MaybeUninit<T>>]>,
    mask: usize,

    /// Written by the sender only.
    send_cursor: CachePadded<AtomicUsize>,

    /// Written by the receiver only, except for overwrite discards.
    rcv_cursor: CachePadded<AtomicUsize>,

    /// Set when either endpoint is dropped
    ///
    /// 任意一端被丢弃时置位
    closed: CachePadded<AtomicBool>,

    /// The receiver blocks here waiting for data
    recv_waiter: W::Waiter,

    /// The sender blocks here waiting for space
    send_waiter: W::Waiter,
}

// SAFETY: Inner<T, W> 可以在线程间安全共享的原因：
// 1. Sender 和 Receiver 都不实现 Clone 且为 !Sync，确保每个游标只有一个写入者
// 2. 槽位只在 [rcv_cursor, send_cursor) 范围内被读取，且由 Release/Acquire 发布
// 3. 覆盖模式下对 rcv_cursor 的并发修改通过 CAS 和 READING 标志串行化
unsafe impl<T: Send, W: WaitStrategy> Sync for Inner<T, W> {}

impl<T, W: WaitStrategy> Inner<T, W> {
    #[inline(always)]
    fn slot(&self, cursor: usize) -> &UnsafeCell<MaybeUninit<T>> {
        // SAFETY: masking keeps the index below buffer.len()
        unsafe { self.buffer.get_unchecked(cursor & self.mask) }
    }

    /// # Safety
    /// The slot must be uninitialized and owned by the sender.
    #[inline(always)]
    unsafe fn write(&self, cursor: usize, value: T) {
        self.slot(cursor).with_mut(|slot| unsafe {
            (*slot).write(value);
        });
    }

    /// # Safety
    /// The slot must be initialized and owned by the caller; it is uninitialized afterwards.
    #[inline(always)]
    unsafe fn take(&self, cursor: usize) -> T {
        self.slot(cursor)
            .with(|slot| unsafe { (*slot).assume_init_read() })
    }

    /// # Safety
    /// Same as [`take`](Self::take).
    #[inline(always)]
    unsafe fn drop_slot(&self, cursor: usize) {
        self.slot(cursor).with_mut(|slot| unsafe {
            (*slot).assume_init_drop();
        });
    }

    #[inline]
    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Number of queued elements as seen from a third party. Exact when called by either
    /// endpoint for its own direction.
    #[inline]
    fn len(&self) -> usize {
        let rcv = self.rcv_cursor.load(Ordering::Acquire) & CURSOR_MASK;
        let send = self.send_cursor.load(Ordering::Acquire);
        distance(rcv, send).min(self.mask)
    }

    fn close(&self) {
        self.closed.store(true, Ordering::Release);

        // Either side may be blocked; waking a thread that is not waiting is harmless
        W::notify(&self.recv_waiter);
        W::notify(&self.send_waiter);
    }
}

impl<T, W: WaitStrategy> Drop for Inner<T, W> {
    fn drop(&mut self) {
        // Both endpoints are gone and ArcPtr's acquire fence made their writes visible
        let send = self.send_cursor.load(Ordering::Relaxed);
        let mut rcv = self.rcv_cursor.load(Ordering::Relaxed) & CURSOR_MASK;

        let unread = distance(rcv, send);
        while rcv != send {
            // SAFETY: cursors in [rcv, send) hold initialized elements nobody else can reach
            unsafe { self.drop_slot(rcv) };
            rcv = advance(rcv);
        }

        if unread > 0 {
            trace!(unread, "spsc interior freed with unread elements");
        }
    }
}

impl<T, W: WaitStrategy> fmt::Debug for Inner<T, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Inner")
            .field("ring_size", &self.buffer.len())
            .field("closed", &self.is_closed())
            .finish()
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Try-send error type
///
/// 尝试发送错误类型
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum TrySendError<T> {
    /// Buffer is full
    ///
    /// 缓冲区已满
    Full(T),

    /// Receiver has been dropped
    ///
    /// 接收者已被丢弃
    Closed(T),
}

impl<T> TrySendError<T> {
    /// Recover the value that was not sent.
    #[inline]
    pub fn into_inner(self) -> T {
        match self {
            TrySendError::Full(value) | TrySendError::Closed(value) => value,
        }
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        matches!(self, TrySendError::Full(_))
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        matches!(self, TrySendError::Closed(_))
    }

    #[inline]
    pub fn status(&self) -> Status {
        match self {
            TrySendError::Full(_) => Status::ChannelFull,
            TrySendError::Closed(_) => Status::ChannelClosed,
        }
    }
}

impl<T> fmt::Debug for TrySendError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrySendError::Full(_) => f.write_str("Full(..)"),
            TrySendError::Closed(_) => f.write_str("Closed(..)"),
        }
    }
}

impl<T> fmt::Display for TrySendError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.status(), f)
    }
}

impl<T> std::error::Error for TrySendError<T> {}

/// Send error: the receiver has been dropped. Carries the value back.
///
/// 发送错误：接收者已被丢弃，返还未发送的值。
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct SendError<T>(pub T);

impl<T> SendError<T> {
    #[inline]
    pub fn into_inner(self) -> T {
        self.0
    }

    #[inline]
    pub fn status(&self) -> Status {
        Status::ChannelClosed
    }
}

impl<T> fmt::Debug for SendError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SendError(..)")
    }
}

impl<T> fmt::Display for SendError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sending on a closed channel")
    }
}

impl<T> std::error::Error for SendError<T> {}

/// Try-receive error type
///
/// 尝试接收错误类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TryRecvError {
    /// Channel is empty
    ///
    /// 通道为空
    Empty,

    /// The oldest element was overwritten while this receive was claiming it. Only produced
    /// with [`OverwriteOnFull`](crate::strategy::OverwriteOnFull); retrying reads a newer one.
    ///
    /// 最旧的元素在本次接收认领时被覆盖，仅在覆盖模式下出现，重试即可读取更新的元素
    SkipDueToOverwrite,

    /// Sender has been dropped and the channel is drained
    ///
    /// 发送者已被丢弃且通道已清空
    Closed,
}

impl TryRecvError {
    #[inline]
    pub fn status(&self) -> Status {
        match self {
            TryRecvError::Empty => Status::ChannelEmpty,
            TryRecvError::SkipDueToOverwrite => Status::SkipDueToOverwrite,
            TryRecvError::Closed => Status::ChannelClosed,
        }
    }
}

impl fmt::Display for TryRecvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.status(), f)
    }
}

impl std::error::Error for TryRecvError {}

/// Receive error: the sender has been dropped and the channel is drained.
///
/// 接收错误：发送者已被丢弃且通道已清空。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecvError;

impl RecvError {
    #[inline]
    pub fn status(&self) -> Status {
        Status::ChannelClosed
    }
}

impl fmt::Display for RecvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "receiving on a closed channel")
    }
}

impl std::error::Error for RecvError {}

// ============================================================================
// Sender
// ============================================================================

/// SPSC channel sender
///
/// Movable to another thread, but neither cloneable nor shareable (`!Sync`).
///
/// SPSC 通道发送器，可以移动到其他线程，但不能克隆也不能共享（`!Sync`）。
pub struct Sender<T, O = WaitOnFull, W: WaitStrategy = BusyLoop> {
    inner: ArcPtr<Inner<T, W>>,

    /// Last observed receive cursor, refreshed only when it says the ring is full
    ///
    /// 最近观察到的接收游标，仅在它显示缓冲区已满时刷新
    rcv_cache: Cell<usize>,

    _overflow: PhantomData<O>,
}

impl<T, O: OverflowStrategy, W: WaitStrategy> Sender<T, O, W> {
    /// Try to send a message without blocking
    ///
    /// With [`OverwriteOnFull`](crate::strategy::OverwriteOnFull) a full ring drops its oldest
    /// element instead of failing, so only `Closed` is possible.
    ///
    /// # Errors
    /// - Returns `TrySendError::Full` if the buffer is full
    /// - Returns `TrySendError::Closed` if the receiver has been dropped
    ///
    /// 尝试非阻塞地发送消息
    ///
    /// # 错误
    /// - 如果缓冲区满，返回 `TrySendError::Full`
    /// - 如果接收器已被丢弃，返回 `TrySendError::Closed`
    pub fn try_send(&self, value: T) -> Result<(), TrySendError<T>> {
        let inner = &*self.inner;

        if inner.is_closed() {
            return Err(TrySendError::Closed(value));
        }

        // Only this sender writes send_cursor
        let send = inner.send_cursor.load(Ordering::Relaxed);

        if distance(self.rcv_cache.get(), send) == inner.mask {
            self.rcv_cache
                .set(inner.rcv_cursor.load(Ordering::Acquire) & CURSOR_MASK);

            if distance(self.rcv_cache.get(), send) == inner.mask {
                if !O::OVERWRITE {
                    return Err(TrySendError::Full(value));
                }
                self.discard_oldest(send);
            }
        }

        // SAFETY: the ring is not full, so the slot at `send` is free and only we write it
        unsafe { inner.write(send, value) };
        inner.send_cursor.store(advance(send), Ordering::Release);

        W::notify(&inner.recv_waiter);
        Ok(())
    }

    /// Make room in a full ring by dropping its oldest element
    ///
    /// Returns once at least one slot is free, either because the discard won or because the
    /// receiver consumed in the meantime.
    #[cold]
    fn discard_oldest(&self, send: usize) {
        let inner = &*self.inner;

        loop {
            let rcv = inner.rcv_cursor.load(Ordering::Acquire);

            if rcv & READING != 0 {
                // The receiver is moving the oldest element out and frees its slot when done
                hint::spin_loop();
                continue;
            }

            if distance(rcv, send) < inner.mask {
                self.rcv_cache.set(rcv);
                return;
            }

            let next = advance(rcv);
            if inner
                .rcv_cursor
                .compare_exchange(rcv, next, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                // SAFETY: the ring was full so `rcv` is initialized, and the CAS took it away
                // from the receiver before it could claim it
                unsafe { inner.drop_slot(rcv) };
                trace!(cursor = rcv, "spsc overwrote oldest element");

                self.rcv_cache.set(next);
                return;
            }
        }
    }

    /// Send a message, waiting while the buffer is full
    ///
    /// Retries [`try_send`](Self::try_send), pausing through the wait strategy between
    /// attempts. There is no timeout: it returns only once the value is accepted or the
    /// receiver is gone.
    ///
    /// # Errors
    /// Returns `SendError` carrying the value if the receiver has been dropped
    ///
    /// 向通道发送消息（缓冲区满时等待）
    ///
    /// # 错误
    /// 如果接收器已被丢弃，返回携带原值的 `SendError`
    pub fn send(&self, mut value: T) -> Result<(), SendError<T>> {
        loop {
            match self.try_send(value) {
                Ok(()) => return Ok(()),
                Err(TrySendError::Closed(v)) => return Err(SendError(v)),
                Err(TrySendError::Full(v)) => {
                    value = v;
                    W::wait(&self.inner.send_waiter, || {
                        !self.is_full() || self.inner.is_closed()
                    });
                }
            }
        }
    }

    /// Check if the receiver has been dropped
    ///
    /// 检查接收者是否已被丢弃
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }

    /// Usable capacity: the rounded ring size minus one
    ///
    /// 可用容量：取整后的环大小减一
    #[inline]
    pub fn capacity(&self) -> usize {
        self.inner.mask
    }

    /// Get the number of messages currently in the channel
    ///
    /// 获取通道中当前的消息数量
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the number of free slots in the channel
    ///
    /// 获取通道中的空闲空间数量
    #[inline]
    pub fn free_slots(&self) -> usize {
        self.capacity() - self.len()
    }

    /// Check if the channel is full
    ///
    /// 检查通道是否已满
    #[inline]
    pub fn is_full(&self) -> bool {
        self.len() == self.capacity()
    }
}

impl<T, O, W: WaitStrategy> Drop for Sender<T, O, W> {
    fn drop(&mut self) {
        // Program order puts this after our last publish, so a receiver that sees `closed`
        // also sees every element we sent
        self.inner.close();
    }
}

impl<T, O, W: WaitStrategy> fmt::Debug for Sender<T, O, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sender")
            .field("closed", &self.inner.is_closed())
            .field("len", &self.inner.len())
            .field("capacity", &self.inner.mask)
            .finish()
    }
}

// ============================================================================
// Receiver
// ============================================================================

/// SPSC channel receiver
///
/// Movable to another thread, but neither cloneable nor shareable (`!Sync`).
///
/// SPSC 通道接收器，可以移动到其他线程，但不能克隆也不能共享（`!Sync`）。
pub struct Receiver<T, O = WaitOnFull, W: WaitStrategy = BusyLoop> {
    inner: ArcPtr<Inner<T, W>>,

    /// Last observed send cursor, refreshed only when it says the ring is empty
    ///
    /// 最近观察到的发送游标，仅在它显示缓冲区为空时刷新
    send_cache: Cell<usize>,

    _overflow: PhantomData<O>,
}

impl<T, O: OverflowStrategy, W: WaitStrategy> Receiver<T, O, W> {
    /// Try to receive a message without blocking
    ///
    /// # Errors
    /// - Returns `TryRecvError::Empty` if the buffer is empty
    /// - Returns `TryRecvError::SkipDueToOverwrite` if an overwriting sender discarded the
    ///   element this call was claiming
    /// - Returns `TryRecvError::Closed` if the sender has been dropped and the buffer is empty
    ///
    /// 尝试非阻塞地接收消息
    ///
    /// # 错误
    /// - 如果缓冲区空，返回 `TryRecvError::Empty`
    /// - 如果覆盖模式的发送者丢弃了本次正在认领的元素，返回 `TryRecvError::SkipDueToOverwrite`
    /// - 如果发送器已被丢弃且缓冲区空，返回 `TryRecvError::Closed`
    pub fn try_recv(&self) -> Result<T, TryRecvError> {
        let inner = &*self.inner;

        // READING is never set here: only this receiver sets it, and clears it before returning
        let rcv = if O::OVERWRITE {
            inner.rcv_cursor.load(Ordering::Acquire)
        } else {
            inner.rcv_cursor.load(Ordering::Relaxed)
        };

        // An overwriting sender can push rcv past our cached send cursor, which shows up as a
        // distance larger than the ring
        let available = distance(rcv, self.send_cache.get());
        if available == 0 || available > inner.mask {
            let mut send = inner.send_cursor.load(Ordering::Acquire);

            if send == rcv {
                if !inner.is_closed() {
                    return Err(TryRecvError::Empty);
                }

                // `closed` is stored after the sender's final publish; look once more
                send = inner.send_cursor.load(Ordering::Acquire);
                if send == rcv {
                    return Err(TryRecvError::Closed);
                }
            }

            self.send_cache.set(send);
        }

        if O::OVERWRITE
            && inner
                .rcv_cursor
                .compare_exchange(rcv, rcv | READING, Ordering::Acquire, Ordering::Relaxed)
                .is_err()
        {
            return Err(TryRecvError::SkipDueToOverwrite);
        }

        // SAFETY: rcv is in [rcv_cursor, send_cursor) and, in overwrite mode, claimed by us
        let value = unsafe { inner.take(rcv) };
        inner.rcv_cursor.store(advance(rcv), Ordering::Release);

        W::notify(&inner.send_waiter);
        Ok(value)
    }

    /// Status-based receive: move the oldest element into `out`
    ///
    /// `out` is left untouched unless [`Status::Success`] is returned.
    ///
    /// 基于状态码的接收：将最旧的元素移动到 `out` 中，仅在返回 `Success` 时修改 `out`。
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

    /// Receive a message, waiting while the buffer is empty
    ///
    /// Returns `Err(RecvError)` only once the sender has been dropped and every element it
    /// sent has been received. There is no timeout.
    ///
    /// 从通道接收消息（缓冲区空时等待）
    ///
    /// 仅当发送者已被丢弃且其发送的所有元素都已接收时返回 `Err(RecvError)`。没有超时。
    pub fn recv(&self) -> Result<T, RecvError> {
        loop {
            match self.try_recv() {
                Ok(value) => return Ok(value),
                Err(TryRecvError::Closed) => return Err(RecvError),
                Err(TryRecvError::SkipDueToOverwrite) => continue,
                Err(TryRecvError::Empty) => {
                    W::wait(&self.inner.recv_waiter, || {
                        !self.inner_is_empty() || self.inner.is_closed()
                    });
                }
            }
        }
    }

    #[inline]
    fn inner_is_empty(&self) -> bool {
        let rcv = self.inner.rcv_cursor.load(Ordering::Acquire) & CURSOR_MASK;
        self.inner.send_cursor.load(Ordering::Acquire) == rcv
    }

    /// Check if the sender has been dropped
    ///
    /// Elements sent before the drop can still be received.
    ///
    /// 检查发送者是否已被丢弃，丢弃前发送的元素仍可接收。
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }

    /// Check if the channel is empty
    ///
    /// 检查通道是否为空
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner_is_empty()
    }

    /// Get the number of messages currently in the channel
    ///
    /// 获取通道中当前的消息数量
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Usable capacity: the rounded ring size minus one
    ///
    /// 可用容量：取整后的环大小减一
    #[inline]
    pub fn capacity(&self) -> usize {
        self.inner.mask
    }

    /// Create a draining iterator
    ///
    /// Yields messages until the channel is momentarily empty (or closed). Overwrite skips are
    /// retried transparently.
    ///
    /// 创建一个消费迭代器，直到通道暂时为空（或已关闭）为止。覆盖跳过会被透明地重试。
    ///
    /// # Examples
    ///
    /// ```
    /// use lite_channel::spsc;
    ///
    /// let (tx, rx) = spsc::channel::<i32>(8);
    /// tx.try_send(1).unwrap();
    /// tx.try_send(2).unwrap();
    /// tx.try_send(3).unwrap();
    ///
    /// let items: Vec<i32> = rx.drain().collect();
    /// assert_eq!(items, vec![1, 2, 3]);
    /// assert!(rx.is_empty());
    /// ```
    #[inline]
    pub fn drain(&self) -> Drain<'_, T, O, W> {
        Drain { receiver: self }
    }
}

impl<T, O, W: WaitStrategy> Drop for Receiver<T, O, W> {
    fn drop(&mut self) {
        self.inner.close();
    }
}

impl<T, O, W: WaitStrategy> fmt::Debug for Receiver<T, O, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Receiver")
            .field("closed", &self.inner.is_closed())
            .field("len", &self.inner.len())
            .field("capacity", &self.inner.mask)
            .finish()
    }
}

/// Draining iterator for the SPSC channel
///
/// SPSC 通道的消费迭代器
pub struct Drain<'a, T, O = WaitOnFull, W: WaitStrategy = BusyLoop> {
    receiver: &'a Receiver<T, O, W>,
}

impl<T, O: OverflowStrategy, W: WaitStrategy> Iterator for Drain<'_, T, O, W> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<T> {
        loop {
            match self.receiver.try_recv() {
                Ok(value) => return Some(value),
                Err(TryRecvError::SkipDueToOverwrite) => continue,
                Err(_) => return None,
            }
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        // The sender may keep adding while we drain
        (self.receiver.len(), None)
    }
}

impl<T, O, W: WaitStrategy> fmt::Debug for Drain<'_, T, O, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Drain")
            .field("len", &self.receiver.inner.len())
            .finish()
    }
}

#[cfg(all(test, not(feature = "loom")))]
mod tests {
    use super::*;
    use crate::strategy::{AtomicWait, OverwriteOnFull, Yield};
    use std::sync::atomic::{AtomicUsize as StdAtomicUsize, Ordering as AtomicOrdering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[derive(Debug)]
    struct DropCounter {
        counter: Arc<StdAtomicUsize>,
    }

    impl Drop for DropCounter {
        fn drop(&mut self) {
            self.counter.fetch_add(1, AtomicOrdering::SeqCst);
        }
    }

    #[test]
    fn test_basic_send_recv() {
        let (tx, rx) = channel::<i32>(4);

        tx.send(1).unwrap();
        tx.send(2).unwrap();
        tx.send(3).unwrap();

        assert_eq!(rx.recv(), Ok(1));
        assert_eq!(rx.recv(), Ok(2));
        assert_eq!(rx.recv(), Ok(3));
    }

    #[test]
    fn test_try_send_recv() {
        let (tx, rx) = channel::<i32>(4);

        tx.try_send(1).unwrap();
        tx.try_send(2).unwrap();

        assert_eq!(rx.try_recv(), Ok(1));
        assert_eq!(rx.try_recv(), Ok(2));
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
    }

    #[test]
    fn test_capacity_rounding() {
        assert_eq!(channel::<u8>(1024).0.capacity(), 1023);
        assert_eq!(channel::<u8>(5).0.capacity(), 7);
        assert_eq!(channel::<u8>(8).1.capacity(), 7);
        assert_eq!(channel::<u8>(9).1.capacity(), 15);

        // Every channel holds at least one element
        assert_eq!(channel::<u8>(1).0.capacity(), 1);
        assert_eq!(channel::<u8>(0).0.capacity(), 1);
    }

    #[test]
    #[should_panic(expected = "capacity overflow")]
    fn test_capacity_overflow_panics() {
        let _ = channel::<u8>(usize::MAX);
    }

    #[test]
    fn test_full_empty_boundary() {
        let (tx, rx) = channel::<u32>(5);

        assert!(tx.is_empty());
        assert_eq!(tx.free_slots(), 7);
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));

        for i in 0..7 {
            tx.try_send(i).unwrap();
        }

        assert!(tx.is_full());
        assert_eq!(tx.len(), 7);
        assert_eq!(tx.free_slots(), 0);
        assert!(matches!(tx.try_send(7), Err(TrySendError::Full(7))));

        assert_eq!(rx.try_recv(), Ok(0));
        assert!(!tx.is_full());
        assert_eq!(tx.free_slots(), 1);
        tx.try_send(7).unwrap();

        for i in 1..=7 {
            assert_eq!(rx.try_recv(), Ok(i));
        }
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
        assert!(rx.is_empty());
    }

    #[test]
    fn test_fifo_with_wraparound() {
        let (tx, rx) = channel::<usize>(4);

        // Keep the ring half full while cycling through it many times
        tx.try_send(0).unwrap();
        for i in 1..1000 {
            tx.try_send(i).unwrap();
            assert_eq!(rx.try_recv(), Ok(i - 1));
        }
        assert_eq!(rx.try_recv(), Ok(999));
        assert!(rx.is_empty());
    }

    #[test]
    fn test_payload_without_default() {
        #[derive(Debug, PartialEq)]
        struct Payload(String);

        let (tx, rx) = channel::<Payload>(2);
        tx.send(Payload("first".to_string())).unwrap();

        let mut out = Payload(String::new());
        assert_eq!(rx.try_recv_into(&mut out), Status::Success);
        assert_eq!(out, Payload("first".to_string()));

        assert_eq!(rx.try_recv_into(&mut out), Status::ChannelEmpty);
        assert_eq!(out, Payload("first".to_string()));
    }

    #[test]
    fn test_channel_closed_on_sender_drop() {
        let (tx, rx) = channel::<i32>(4);

        tx.send(1).unwrap();
        tx.send(2).unwrap();
        drop(tx);

        assert!(rx.is_closed());
        assert_eq!(rx.recv(), Ok(1));
        assert_eq!(rx.try_recv(), Ok(2));
        assert_eq!(rx.try_recv(), Err(TryRecvError::Closed));
        assert_eq!(rx.recv(), Err(RecvError));
    }

    #[test]
    fn test_channel_closed_on_receiver_drop() {
        let (tx, rx) = channel::<i32>(4);

        drop(rx);

        assert!(tx.is_closed());
        assert!(matches!(tx.try_send(1), Err(TrySendError::Closed(1))));
        assert_eq!(tx.send(2).unwrap_err().into_inner(), 2);
    }

    #[test]
    fn test_blocking_send_unblocked_by_receiver_drop() {
        let (tx, rx) = channel_with::<i32, WaitOnFull, AtomicWait>(2);
        tx.try_send(1).unwrap();

        let handle = thread::spawn(move || tx.send(2));

        thread::sleep(Duration::from_millis(10));
        drop(rx);

        assert_eq!(handle.join().unwrap().unwrap_err().0, 2);
    }

    #[test]
    fn test_blocking_recv_unblocked_by_sender_drop() {
        let (tx, rx) = channel_with::<i32, WaitOnFull, AtomicWait>(2);

        let handle = thread::spawn(move || rx.recv());

        thread::sleep(Duration::from_millis(10));
        drop(tx);

        assert_eq!(handle.join().unwrap(), Err(RecvError));
    }

    fn fifo_across_threads<O: OverflowStrategy, W: WaitStrategy>(capacity: usize, count: usize) {
        let (tx, rx) = channel_with::<usize, O, W>(capacity);

        let producer = thread::spawn(move || {
            for i in 0..count {
                tx.send(i).unwrap();
            }
        });

        let mut expected = 0;
        while let Ok(value) = rx.recv() {
            assert_eq!(value, expected);
            expected += 1;
        }

        producer.join().unwrap();
        assert_eq!(expected, count);
    }

    #[test]
    fn test_cross_thread_busy_loop() {
        fifo_across_threads::<WaitOnFull, BusyLoop>(4, 20_000);
    }

    #[test]
    fn test_cross_thread_yield() {
        fifo_across_threads::<WaitOnFull, Yield>(16, 20_000);
    }

    #[test]
    fn test_cross_thread_atomic_wait() {
        fifo_across_threads::<WaitOnFull, AtomicWait>(2, 20_000);
    }

    #[test]
    fn test_cross_thread_large_capacity() {
        fifo_across_threads::<WaitOnFull, BusyLoop>(1024, 50_000);
    }

    #[test]
    fn test_overwrite_keeps_newest() {
        let (tx, rx) = channel_with::<char, OverwriteOnFull, BusyLoop>(4);
        assert_eq!(tx.capacity(), 3);

        for c in ['a', 'b', 'c', 'd', 'e'] {
            tx.try_send(c).unwrap();
        }

        assert_eq!(tx.len(), 3);
        assert_eq!(rx.try_recv(), Ok('c'));
        assert_eq!(rx.try_recv(), Ok('d'));
        assert_eq!(rx.try_recv(), Ok('e'));
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
    }

    #[test]
    fn test_overwrite_drops_discarded_elements() {
        let counter = Arc::new(StdAtomicUsize::new(0));
        let (tx, rx) = channel_with::<DropCounter, OverwriteOnFull, BusyLoop>(4);

        for _ in 0..5 {
            tx.send(DropCounter {
                counter: counter.clone(),
            })
            .unwrap();
        }
        assert_eq!(counter.load(AtomicOrdering::SeqCst), 2);

        drop(rx.try_recv().unwrap());
        assert_eq!(counter.load(AtomicOrdering::SeqCst), 3);

        drop(tx);
        drop(rx);
        assert_eq!(counter.load(AtomicOrdering::SeqCst), 5);
    }

    #[test]
    fn test_overwrite_interleaved_with_receives() {
        let (tx, rx) = channel_with::<u32, OverwriteOnFull, BusyLoop>(2);

        tx.try_send(1).unwrap();
        tx.try_send(2).unwrap();
        assert_eq!(rx.try_recv(), Ok(2));

        tx.try_send(3).unwrap();
        assert_eq!(rx.try_recv(), Ok(3));
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));

        tx.try_send(4).unwrap();
        tx.try_send(5).unwrap();
        tx.try_send(6).unwrap();
        assert_eq!(rx.try_recv(), Ok(6));
    }

    #[test]
    fn test_overwrite_concurrent_reader() {
        const COUNT: u64 = 50_000;
        let (tx, rx) = channel_with::<u64, OverwriteOnFull, BusyLoop>(4);

        let producer = thread::spawn(move || {
            for i in 0..COUNT {
                tx.try_send(i).unwrap();
            }
        });

        let mut last = None;
        let mut received = 0u64;
        loop {
            match rx.try_recv() {
                Ok(value) => {
                    // Survivors still arrive in order
                    if let Some(prev) = last {
                        assert!(value > prev, "{value} after {prev}");
                    }
                    last = Some(value);
                    received += 1;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::SkipDueToOverwrite) => {}
                Err(TryRecvError::Closed) => break,
            }
        }

        producer.join().unwrap();
        assert!(received > 0);
        // Nothing can overwrite the final element once the sender is gone
        assert_eq!(last, Some(COUNT - 1));
    }

    #[test]
    fn test_drop_drains_live_elements() {
        let counter = Arc::new(StdAtomicUsize::new(0));

        {
            let (tx, rx) = channel::<DropCounter>(8);
            for _ in 0..3 {
                tx.try_send(DropCounter {
                    counter: counter.clone(),
                })
                .unwrap();
            }

            assert_eq!(counter.load(AtomicOrdering::SeqCst), 0);
            drop(tx);
            assert_eq!(counter.load(AtomicOrdering::SeqCst), 0);
            drop(rx);
        }

        assert_eq!(counter.load(AtomicOrdering::SeqCst), 3);
    }

    #[test]
    fn test_drop_after_wraparound() {
        let counter = Arc::new(StdAtomicUsize::new(0));
        let (tx, rx) = channel::<DropCounter>(4);

        for _ in 0..10 {
            tx.try_send(DropCounter {
                counter: counter.clone(),
            })
            .unwrap();
            drop(rx.try_recv().unwrap());
        }
        assert_eq!(counter.load(AtomicOrdering::SeqCst), 10);

        for _ in 0..3 {
            tx.try_send(DropCounter {
                counter: counter.clone(),
            })
            .unwrap();
        }

        drop(rx);
        drop(tx);
        assert_eq!(counter.load(AtomicOrdering::SeqCst), 13);
    }

    #[test]
    fn test_drain() {
        let (tx, rx) = channel::<i32>(16);

        for i in 0..10 {
            tx.try_send(i).unwrap();
        }

        let collected: Vec<i32> = rx.drain().collect();

        assert_eq!(collected, (0..10).collect::<Vec<_>>());
        assert!(rx.is_empty());
    }

    #[test]
    fn test_drain_empty() {
        let (_tx, rx) = channel::<i32>(8);

        assert_eq!(rx.drain().size_hint(), (0, None));
        assert!(rx.drain().next().is_none());
    }

    #[test]
    fn test_error_statuses() {
        assert_eq!(TrySendError::Full(()).status(), Status::ChannelFull);
        assert_eq!(TrySendError::Closed(()).status(), Status::ChannelClosed);
        assert_eq!(SendError(()).status(), Status::ChannelClosed);
        assert_eq!(TryRecvError::Empty.status(), Status::ChannelEmpty);
        assert_eq!(
            TryRecvError::SkipDueToOverwrite.status(),
            Status::SkipDueToOverwrite
        );
        assert_eq!(RecvError.status(), Status::ChannelClosed);
        assert_eq!(TrySendError::Full(3).to_string(), "channel full");
    }

    #[test]
    fn test_endpoints_are_send() {
        fn assert_send<T: Send>() {}
        assert_send::<Sender<String>>();
        assert_send::<Receiver<String, OverwriteOnFull, AtomicWait>>();
    }

    mod prop {
        use super::super::*;
        use proptest::prelude::*;
        use std::collections::VecDeque;

        #[derive(Debug, Clone)]
        enum Op {
            Send(u64),
            Recv,
        }

        fn op_strategy() -> impl Strategy<Value = Op> {
            prop_oneof![any::<u64>().prop_map(Op::Send), Just(Op::Recv)]
        }

        proptest! {
            /// Random interleaving of sends and receives on one thread preserves FIFO, and
            /// full/empty are reported exactly at the usable-capacity boundaries.
            #[test]
            fn fifo_and_boundaries(
                capacity in 0usize..40,
                ops in proptest::collection::vec(op_strategy(), 0..400),
            ) {
                let (tx, rx) = channel::<u64>(capacity);
                let usable = tx.capacity();
                prop_assert_eq!(usable, capacity.max(2).next_power_of_two() - 1);

                let mut model = VecDeque::new();

                for op in &ops {
                    match op {
                        Op::Send(v) => match tx.try_send(*v) {
                            Ok(()) => model.push_back(*v),
                            Err(TrySendError::Full(back)) => {
                                prop_assert_eq!(back, *v);
                                prop_assert_eq!(model.len(), usable);
                            }
                            Err(TrySendError::Closed(_)) => prop_assert!(false, "unexpected close"),
                        },
                        Op::Recv => match rx.try_recv() {
                            Ok(v) => prop_assert_eq!(Some(v), model.pop_front(), "FIFO violated"),
                            Err(err) => {
                                prop_assert_eq!(err, TryRecvError::Empty);
                                prop_assert!(model.is_empty());
                            }
                        },
                    }
                    prop_assert_eq!(rx.len(), model.len());
                }
            }
        }
    }
}
