//! Audio input: live capture and file decoding, both producing fixed-size
//! PCM frames for the streaming session.

pub mod capture;
pub mod chunker;
pub mod file;

pub use capture::{list_devices, LiveCapture};
pub use chunker::{carve_frames, FrameChunker};
pub use file::{decode_wav, resample};
