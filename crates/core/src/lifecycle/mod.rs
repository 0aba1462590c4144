pub mod progress_feed;
pub mod resource_manager;
pub mod working_area;
