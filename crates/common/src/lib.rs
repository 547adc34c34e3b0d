pub mod ffmpeg;
pub mod error;
pub mod sanitize;
pub mod source;
pub mod timecode;

pub use ffmpeg::*;
pub use error::*;
pub use sanitize::*;
pub use source::*;
pub use timecode::*;
