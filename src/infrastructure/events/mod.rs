//! Events - 客户端事件广播

mod publisher;

pub use publisher::{ClientEvent, EventPublisher};
