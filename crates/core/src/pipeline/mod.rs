pub mod crop_video_use_case;
pub mod extract_frames_use_case;
pub mod interrupt_listener;
pub mod orchestrator_config;
pub mod pipeline_error;
pub mod pipeline_orchestrator;
pub mod run_state;
pub mod scan_subtitles_use_case;

#[cfg(test)]
pub(crate) mod test_support;
