pub mod progress_board;
pub mod progress_monitor;
