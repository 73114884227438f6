//! Audio Backend Port - 可播放音频资源抽象
//!
//! 控制器通过该端口把音频字节解码为可播放资源，并独占持有该资源。

use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::oneshot;

use crate::application::error::ClientError;

/// 播放自然结束通知
///
/// 资源被释放时发送端随之销毁，接收端得到 `Err`。
pub type PlaybackEnded = oneshot::Receiver<()>;

/// 可播放音频资源
///
/// 持有一个临时缓冲区；`release` 之后缓冲区被回收，资源不可再使用。
pub trait PlaybackResource: Send {
    /// 缓冲区标识
    fn buffer_id(&self) -> &str;

    /// 音频总时长
    fn duration(&self) -> Duration;

    /// 从当前位置开始播放，返回播放结束通知
    fn start(&mut self) -> PlaybackEnded;

    /// 暂停播放
    fn pause(&mut self);

    /// 播放位置归零
    fn rewind(&mut self);

    /// 释放资源并回收临时缓冲区（可重复调用）
    fn release(&mut self);
}

#[async_trait]
pub trait AudioBackendPort: Send + Sync {
    /// 解码音频字节为可播放资源
    async fn load(&self, bytes: Vec<u8>) -> Result<Box<dyn PlaybackResource>, ClientError>;
}
