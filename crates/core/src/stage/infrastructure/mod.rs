pub mod ffmpeg_engine;
pub mod ffprobe_duration_probe;
pub mod process_group;
pub mod stage_handle;
pub mod tesseract_engine;
