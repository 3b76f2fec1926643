//! Shim module to abstract over std and loom primitives.
//!
//! This module provides a unified interface for synchronization primitives that transparently
//! switches between the `core`/`std` implementation (for production) and the `loom`
//! implementation (for model checking).

#[cfg(not(feature = "loom"))]
pub mod atomic {
    pub use core::sync::atomic::*;
}

#[cfg(feature = "loom")]
pub mod atomic {
    pub use loom::sync::atomic::*;
}

#[cfg(not(feature = "loom"))]
pub mod cell {
    #[derive(Debug)]
    #[repr(transparent)]
    pub struct UnsafeCell<T: ?Sized>(core::cell::UnsafeCell<T>);

    impl<T> UnsafeCell<T> {
        #[inline]
        pub const fn new(data: T) -> UnsafeCell<T> {
            UnsafeCell(core::cell::UnsafeCell::new(data))
        }
    }

    impl<T: ?Sized> UnsafeCell<T> {
        #[inline]
        pub fn with<F, R>(&self, f: F) -> R
        where
            F: FnOnce(*const T) -> R,
        {
            f(self.0.get())
        }

        #[inline]
        pub fn with_mut<F, R>(&self, f: F) -> R
        where
            F: FnOnce(*mut T) -> R,
        {
            f(self.0.get())
        }
    }
}

#[cfg(feature = "loom")]
pub mod cell {
    pub use loom::cell::UnsafeCell;
}

#[cfg(not(feature = "loom"))]
pub mod thread {
    pub use std::thread::{current, park, yield_now, Thread};
}

#[cfg(feature = "loom")]
pub mod thread {
    pub use loom::thread::{current, park, yield_now, Thread};
}

/// Pause primitives used inside retry loops.
///
/// Loom cannot explore a loop that never yields, so every pause becomes a scheduler
/// yield under the model checker.
pub mod hint {
    /// Compiler-only barrier: keeps the optimizer from hoisting loads out of a spin loop
    /// without emitting any instruction.
    #[cfg(not(feature = "loom"))]
    #[inline(always)]
    pub fn compiler_barrier() {
        core::sync::atomic::compiler_fence(core::sync::atomic::Ordering::SeqCst);
    }

    #[cfg(feature = "loom")]
    #[inline(always)]
    pub fn compiler_barrier() {
        loom::thread::yield_now();
    }

    #[cfg(not(feature = "loom"))]
    #[inline(always)]
    pub fn spin_loop() {
        core::hint::spin_loop();
    }

    #[cfg(feature = "loom")]
    #[inline(always)]
    pub fn spin_loop() {
        loom::thread::yield_now();
    }
}
