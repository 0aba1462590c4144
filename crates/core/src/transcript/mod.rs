pub mod transcript_reducer;
