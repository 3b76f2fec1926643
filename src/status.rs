//! Response status shared by every channel flavor.
//!
//! 所有通道类型共享的响应状态。
//!
//! Each channel reports failures through its own typed error (which hands the rejected value
//! back where there is one). Every error converts into this single closed enumeration so callers
//! that prefer status codes can match on one type.
//!
//! 每种通道都通过自己的类型化错误报告失败，所有错误都可以转换为这个封闭枚举。

use std::fmt;

/// Outcome of a channel operation.
///
/// 通道操作的结果。
///
/// The variants fall into three groups:
/// - capacity: [`ChannelFull`](Status::ChannelFull), [`ChannelEmpty`](Status::ChannelEmpty).
///   Expected and frequent; poll or retry.
/// - lifecycle: [`ChannelClosed`](Status::ChannelClosed),
///   [`ReceiverClosed`](Status::ReceiverClosed), [`SenderClosed`](Status::SenderClosed).
///   The peer is gone or a one-shot has been used up; retrying will not help.
/// - consistency: [`SkipDueToOverwrite`](Status::SkipDueToOverwrite). An overwriting sender
///   discarded the element the receiver was about to read; the next attempt reads a newer one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// The operation completed.
    ///
    /// 操作成功
    Success,
    /// The ring has no free slot.
    ///
    /// 环形缓冲区已满
    ChannelFull,
    /// Nothing is available to receive yet.
    ///
    /// 暂无可接收的数据
    ChannelEmpty,
    /// The oldest element was overwritten while the receiver was reading it.
    ///
    /// 最旧的元素在读取时被覆盖
    SkipDueToOverwrite,
    /// The other endpoint has been dropped.
    ///
    /// 另一端已被丢弃
    ChannelClosed,
    /// The one-shot value has already been received.
    ///
    /// 一次性通道的值已被接收
    ReceiverClosed,
    /// The one-shot value has already been sent.
    ///
    /// 一次性通道的值已被发送
    SenderClosed,
}

impl Status {
    #[inline]
    pub fn is_success(self) -> bool {
        matches!(self, Status::Success)
    }

    /// Whether retrying the same operation later can succeed.
    ///
    /// 稍后重试同一操作是否可能成功。
    #[inline]
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            Status::ChannelFull | Status::ChannelEmpty | Status::SkipDueToOverwrite
        )
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Success => "success",
            Status::ChannelFull => "channel full",
            Status::ChannelEmpty => "channel empty",
            Status::SkipDueToOverwrite => "element skipped due to overwrite",
            Status::ChannelClosed => "channel closed",
            Status::ReceiverClosed => "receiver closed",
            Status::SenderClosed => "sender closed",
        };
        f.write_str(s)
    }
}
