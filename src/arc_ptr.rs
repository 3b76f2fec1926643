//! Single-allocation atomically reference counted pointer.
//!
//! 单次分配的原子引用计数指针。
//!
//! `ArcPtr<T>` keeps the reference count and the value in one heap block. It has no weak
//! references, which keeps the control block at one counter and `Drop` at one atomic RMW.
//! The channels in this crate use it as their shared control block.
//!
//! `ArcPtr<T>` 将引用计数与值放在同一个堆块中，没有弱引用。
//! 本库中的通道使用它作为共享控制块。
//!
//! # Examples
//!
//! ```
//! use lite_channel::arc_ptr::ArcPtr;
//! use std::thread;
//!
//! let shared = ArcPtr::new(vec![1, 2, 3]);
//! let cloned = shared.clone();
//! assert_eq!(shared.use_count(), 2);
//!
//! let handle = thread::spawn(move || cloned.iter().sum::<i32>());
//! assert_eq!(handle.join().unwrap(), 6);
//! assert_eq!(shared.use_count(), 1);
//! ```

use crate::shim::atomic::{self, AtomicUsize, Ordering};
use std::cell::UnsafeCell;
use std::fmt;
use std::marker::PhantomData;
use std::ops::Deref;
use std::ptr::NonNull;

/// Past this count a leaked-clone loop would eventually wrap the counter.
const MAX_REFCOUNT: usize = isize::MAX as usize;

struct ArcInner<T> {
    count: AtomicUsize,
    data: UnsafeCell<T>,
}

/// Atomically reference counted pointer with a colocated counter.
///
/// 计数器与数据同址存放的原子引用计数指针。
///
/// Shared access through [`Deref`] is race free. Mutation is only offered through
/// [`get_mut`](ArcPtr::get_mut) (checked, requires uniqueness) and
/// [`get_mut_unchecked`](ArcPtr::get_mut_unchecked) (unchecked, caller synchronizes).
pub struct ArcPtr<T> {
    ptr: NonNull<ArcInner<T>>,
    _marker: PhantomData<ArcInner<T>>,
}

// SAFETY: 与 std::sync::Arc 相同的约束：
// 跨线程克隆或 drop 需要 T: Send（最后一个持有者负责销毁 T），
// 共享 &T 需要 T: Sync。
unsafe impl<T: Send + Sync> Send for ArcPtr<T> {}
unsafe impl<T: Send + Sync> Sync for ArcPtr<T> {}

impl<T> ArcPtr<T> {
    /// Allocate a new control block holding `data`, with a use count of 1.
    ///
    /// 分配一个持有 `data` 的新控制块，引用计数为 1。
    #[inline]
    pub fn new(data: T) -> Self {
        let boxed = Box::new(ArcInner {
            count: AtomicUsize::new(1),
            data: UnsafeCell::new(data),
        });

        ArcPtr {
            // SAFETY: Box::into_raw never returns null
            ptr: unsafe { NonNull::new_unchecked(Box::into_raw(boxed)) },
            _marker: PhantomData,
        }
    }

    #[inline]
    fn inner(&self) -> &ArcInner<T> {
        // SAFETY: while this handle is alive the count is at least 1, so the block is live
        unsafe { self.ptr.as_ref() }
    }

    /// Shared reference to the value. Same as `Deref`.
    #[inline]
    pub fn get(&self) -> &T {
        // SAFETY: mutable access is only handed out under the contracts of get_mut and
        // get_mut_unchecked
        unsafe { &*self.inner().data.get() }
    }

    /// Current number of handles pointing at this control block.
    ///
    /// 当前指向该控制块的句柄数量。
    ///
    /// The value may be stale by the time it is read if other threads clone or drop handles
    /// concurrently.
    #[inline]
    pub fn use_count(&self) -> usize {
        self.inner().count.load(Ordering::Relaxed)
    }

    /// Whether both handles point at the same control block.
    #[inline]
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        this.ptr == other.ptr
    }

    /// Mutable access when this is the only handle.
    ///
    /// 当此句柄是唯一持有者时返回可变引用。
    ///
    /// Returns `None` if any other handle exists.
    #[inline]
    pub fn get_mut(&mut self) -> Option<&mut T> {
        // Acquire pairs with the Release decrement of handles dropped on other threads, so
        // their last reads of the value happen before our writes.
        if self.inner().count.load(Ordering::Acquire) == 1 {
            // SAFETY: we hold the only handle and `&mut self` prevents new clones
            Some(unsafe { &mut *self.inner().data.get() })
        } else {
            None
        }
    }

    /// Mutable access without any check.
    ///
    /// 不做任何检查的可变访问。
    ///
    /// # Safety
    ///
    /// While the returned reference lives, no other access to the value may happen through
    /// this or any other handle, on any thread. Mutating through it while other holders read
    /// without external synchronization is a data race.
    ///
    /// 返回的引用存活期间，任何线程都不得通过任何句柄访问该值。
    /// 在没有外部同步的情况下修改且其他持有者同时读取属于数据竞争。
    #[inline]
    #[allow(clippy::mut_from_ref)]
    pub unsafe fn get_mut_unchecked(&self) -> &mut T {
        &mut *self.inner().data.get()
    }
}

impl<T> Clone for ArcPtr<T> {
    #[inline]
    fn clone(&self) -> Self {
        // Relaxed is enough: a new handle can only be made from an existing one, and handing
        // that one to another thread already carries the needed synchronization.
        let old = self.inner().count.fetch_add(1, Ordering::Relaxed);
        if old > MAX_REFCOUNT {
            std::process::abort();
        }

        ArcPtr {
            ptr: self.ptr,
            _marker: PhantomData,
        }
    }
}

impl<T> Drop for ArcPtr<T> {
    fn drop(&mut self) {
        // Release so our uses of the value happen before the destruction below ...
        if self.inner().count.fetch_sub(1, Ordering::Release) != 1 {
            return;
        }

        // ... and acquire so the destroying thread sees every other holder's uses.
        atomic::fence(Ordering::Acquire);

        // SAFETY: count reached zero, no other handle exists
        unsafe {
            drop(Box::from_raw(self.ptr.as_ptr()));
        }
    }
}

impl<T> Deref for ArcPtr<T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        self.get()
    }
}

impl<T> AsRef<T> for ArcPtr<T> {
    #[inline]
    fn as_ref(&self) -> &T {
        self.get()
    }
}

impl<T> From<T> for ArcPtr<T> {
    #[inline]
    fn from(data: T) -> Self {
        ArcPtr::new(data)
    }
}

impl<T: Default> Default for ArcPtr<T> {
    fn default() -> Self {
        ArcPtr::new(T::default())
    }
}

impl<T: PartialEq> PartialEq for ArcPtr<T> {
    fn eq(&self, other: &Self) -> bool {
        self.get() == other.get()
    }
}

impl<T: Eq> Eq for ArcPtr<T> {}

impl<T: fmt::Debug> fmt::Debug for ArcPtr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.get(), f)
    }
}

impl<T: fmt::Display> fmt::Display for ArcPtr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.get(), f)
    }
}
