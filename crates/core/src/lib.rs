//! Streaming pipeline that crops a video, samples frames and runs OCR on
//! each frame to recover hardcoded subtitles.
//!
//! The heavy lifting is done by external engines (ffmpeg, tesseract); this
//! crate wires them together, reports progress, propagates cancellation
//! and cleans up every temporary resource it creates.

pub mod lifecycle;
pub mod pipeline;
pub mod progress;
pub mod shared;
pub mod stage;
pub mod transcript;
