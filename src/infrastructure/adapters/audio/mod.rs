//! Audio Adapter - 可播放音频资源实现

mod buffered_playback;

pub use buffered_playback::{decode_audio, BufferedPlayback, BufferedPlaybackBackend, DecodedInfo};
