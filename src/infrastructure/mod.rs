//! Infrastructure Layer - 基础设施层
//!
//! 提供所有端口的具体实现

pub mod adapters;
pub mod console;
pub mod events;

pub use adapters::{BufferedPlaybackBackend, HttpCollaboratorClient, HttpCollaboratorConfig};
pub use console::{ConsoleShell, ShellCommand, ShellOutcome};
pub use events::{ClientEvent, EventPublisher};
