//! Infrastructure Adapters
//!
//! 六边形架构的适配器实现

pub mod audio;
pub mod backend;

pub use audio::BufferedPlaybackBackend;
pub use backend::{HttpCollaboratorClient, HttpCollaboratorConfig};
