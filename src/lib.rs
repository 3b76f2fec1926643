//! # lite-channel
//!
//! Low-latency inter-thread channels for Rust: a bounded lock-free SPSC ring, a one-shot value
//! handoff, and the single-allocation refcounted pointer they share state through.
//!
//! 面向 Rust 的低延迟线程间通道：有界无锁 SPSC 环形通道、一次性值传递通道，
//! 以及它们共享状态所用的单次分配引用计数指针。
//!
//! ## Overview / 概述
//!
//! Every channel is created as a linked `(Sender, Receiver)` pair over one shared control block.
//! The endpoints are movable but neither cloneable nor shareable, so each side of a channel has
//! exactly one owner at compile time. That single-owner guarantee is what lets the hot paths get
//! away with relaxed loads of a side's own cursor and release/acquire pairs across sides,
//! without any lock.
//!
//! 每个通道都以一对 `(Sender, Receiver)` 的形式创建，共享同一个控制块。
//! 端点可以移动，但不能克隆也不能共享，因此编译期即保证通道每一端只有一个所有者。
//! 正是这种单一所有权保证，热路径才能在无锁的情况下使用 relaxed 加载自身游标，
//! 并在两端之间使用 release/acquire 配对。
//!
//! ## Key Features / 主要特性
//!
//! - **Lock-free fast paths**: only atomics with documented orderings
//! - **Cached peer cursors**: cross-core traffic roughly once per wraparound
//! - **No `Default` bound**: payloads live in `MaybeUninit` slots
//! - **Compile-time strategies**: overflow and wait behavior are type parameters
//!
//! - **无锁快速路径**：仅使用具有明确内存序的原子操作
//! - **缓存对端游标**：大约每绕一圈才产生一次跨核通信
//! - **无需 `Default`**：负载存放在 `MaybeUninit` 槽位中
//! - **编译期策略**：溢出与等待行为都是类型参数
//!
//! ## Modules / 模块
//!
//! ### [`spsc`]
//!
//! Bounded SPSC ring channel. Capacity is rounded up to a power of two, one slot stays free.
//! Overflow is either [`WaitOnFull`](strategy::WaitOnFull) or
//! [`OverwriteOnFull`](strategy::OverwriteOnFull).
//!
//! 有界 SPSC 环形通道。容量向上取整为 2 的幂，保留一个空槽。
//!
//! ### [`oneshot`]
//!
//! Single-value handoff with a `NOT_SENT → SENT → RECEIVED` state word. Sending twice or
//! receiving twice fails with a status instead of misbehaving.
//!
//! 基于 `NOT_SENT → SENT → RECEIVED` 状态字的单值传递。重复发送或重复接收都会返回状态码。
//!
//! ### [`strategy`]
//!
//! Overflow strategies and wait strategies ([`BusyLoop`](strategy::BusyLoop),
//! [`Yield`](strategy::Yield), [`AtomicWait`](strategy::AtomicWait)).
//!
//! ### [`notify`]
//!
//! Single-waiter blocking notifier behind [`AtomicWait`](strategy::AtomicWait).
//!
//! 支撑 `AtomicWait` 的单等待者阻塞通知器。
//!
//! ### [`arc_ptr`]
//!
//! `ArcPtr<T>`: atomic refcount and value in one allocation, no weak references.
//!
//! ### [`status`]
//!
//! The closed [`Status`] enumeration every channel error maps onto.
//!
//! ## Examples / 示例
//!
//! ### SPSC ring across threads
//!
//! ```
//! use lite_channel::spsc;
//! use lite_channel::strategy::{WaitOnFull, Yield};
//! use std::thread;
//!
//! let (tx, rx) = spsc::channel_with::<u64, WaitOnFull, Yield>(64);
//!
//! let producer = thread::spawn(move || {
//!     for i in 0..10 {
//!         tx.send(i).unwrap();
//!     }
//! });
//!
//! let mut sum = 0;
//! while let Ok(value) = rx.recv() {
//!     sum += value;
//! }
//! producer.join().unwrap();
//! assert_eq!(sum, 45); // 0+1+2+...+9
//! ```
//!
//! ### One-shot with status codes
//!
//! ```
//! use lite_channel::{oneshot, Status};
//!
//! let (tx, rx) = oneshot::channel::<&str>();
//!
//! let mut out = "";
//! assert_eq!(rx.try_recv_into(&mut out), Status::ChannelEmpty);
//!
//! tx.send("done").unwrap();
//! assert_eq!(tx.send("again").unwrap_err().status(), Status::SenderClosed);
//!
//! assert_eq!(rx.try_recv_into(&mut out), Status::Success);
//! assert_eq!(out, "done");
//! assert_eq!(rx.try_recv_into(&mut out), Status::ReceiverClosed);
//! ```
//!
//! ## Safety / 安全性
//!
//! All primitives use `unsafe` internally for performance but expose safe APIs.
//! Safety is guaranteed through:
//!
//! 所有原语在内部使用 `unsafe` 以提高性能，但暴露安全的 API。
//! 安全性通过以下方式保证：
//!
//! - Type system enforcement of single ownership (endpoints are neither `Clone` nor `Sync`)
//! - Atomic cursors and state words as the only synchronization points
//! - Model checking of the orderings with `loom` (`--features loom`)
//!
//! - 类型系统强制单一所有权（端点既不实现 `Clone` 也不实现 `Sync`）
//! - 原子游标与状态字是唯一的同步点
//! - 使用 `loom` 对内存序进行模型检查（`--features loom`）

pub mod arc_ptr;
pub mod notify;
pub mod oneshot;
pub mod spsc;
pub mod status;
pub mod strategy;

mod parker;
mod shim;
mod trace;

pub use status::Status;
pub use trace::init_tracing;
