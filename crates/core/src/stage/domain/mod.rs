pub mod duration_probe;
pub mod exec_template;
pub mod media_engine;
pub mod ocr_engine;
pub mod pipeline_spec;
pub mod stage_definition;
pub mod stage_error;
