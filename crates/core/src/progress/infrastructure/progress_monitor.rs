use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;
use std::thread::{self, JoinHandle};

use crate::lifecycle::progress_feed::{FeedEnds, ProgressFeed};
use crate::progress::domain::progress_record::elapsed_micros;
use crate::progress::domain::progress_tracker::ProgressTracker;

use super::progress_board::BoardSlot;

/// Background reader for one stage's progress feed.
///
/// Only ever reads from the FIFO, so the stage runs at full speed whether
/// or not anything is displayed. Owns the feed: the FIFO is unlinked after
/// the reader thread has drained it to end-of-stream.
pub struct ProgressMonitor {
    keepalive: Option<File>,
    thread: Option<JoinHandle<usize>>,
    feed: Option<ProgressFeed>,
}

impl ProgressMonitor {
    /// Attaches to the feed and starts draining it. Call before spawning
    /// the stage that writes to the feed.
    pub fn start(feed: ProgressFeed, slot: BoardSlot) -> io::Result<Self> {
        let FeedEnds { reader, keepalive } = feed.attach()?;
        let tracker = ProgressTracker::new(feed.scale());
        let thread = thread::Builder::new()
            .name(format!("progress-{}", slot.index()))
            .spawn(move || drain(reader, tracker, &slot))?;
        Ok(Self {
            keepalive: Some(keepalive),
            thread: Some(thread),
            feed: Some(feed),
        })
    }

    pub fn feed_path(&self) -> Option<&Path> {
        self.feed.as_ref().map(|f| f.path())
    }

    /// Signals end-of-stream and waits for the reader. Call once the stage
    /// has exited. Returns the number of redraws performed.
    pub fn finish(mut self) -> usize {
        self.shutdown()
    }

    fn shutdown(&mut self) -> usize {
        self.keepalive.take();
        let redraws = match self.thread.take() {
            Some(thread) => thread.join().unwrap_or_else(|_| {
                log::warn!("Progress monitor thread panicked");
                0
            }),
            None => 0,
        };
        self.feed.take();
        redraws
    }
}

impl Drop for ProgressMonitor {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Reads progress records until end-of-stream, publishing a snapshot for
/// every strict advance and a completion snapshot at the end.
pub fn drain<R: Read>(reader: R, mut tracker: ProgressTracker, slot: &BoardSlot) -> usize {
    let mut redraws = 0;
    for line in BufReader::new(reader).lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                log::debug!("Progress feed read failed: {e}");
                break;
            }
        };
        if let Some(snapshot) = elapsed_micros(&line).and_then(|us| tracker.observe(us)) {
            slot.send(snapshot);
            redraws += 1;
        }
    }
    slot.send(tracker.finish());
    redraws
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::domain::progress_tracker::{ProgressScale, ProgressSnapshot};
    use crate::progress::infrastructure::progress_board::test_slot;
    use std::fs::OpenOptions;
    use std::io::Write;
    use tempfile::TempDir;

    const FEED: &str = "frame=1\nout_time_us=0\nout_time_ms=0\nprogress=continue\n\
                        out_time_us=2000000\nout_time_ms=2000000\nprogress=continue\n\
                        out_time_us=2000000\nout_time_ms=2000000\nprogress=end\n";

    #[test]
    fn test_drain_redraws_on_strict_increase_then_completes() {
        let (slot, rx) = test_slot(3);
        let tracker = ProgressTracker::new(ProgressScale::Known(4.0));
        let redraws = drain(FEED.as_bytes(), tracker, &slot);
        drop(slot);

        let received: Vec<_> = rx.iter().collect();
        assert_eq!(redraws, 2);
        assert_eq!(
            received,
            vec![
                (
                    3,
                    ProgressSnapshot::Percent {
                        percent: 0,
                        elapsed_us: 0
                    }
                ),
                (
                    3,
                    ProgressSnapshot::Percent {
                        percent: 50,
                        elapsed_us: 2_000_000
                    }
                ),
                (3, ProgressSnapshot::Complete),
            ]
        );
    }

    #[test]
    fn test_empty_feed_still_completes() {
        let (slot, rx) = test_slot(0);
        drain(io::empty(), ProgressTracker::new(ProgressScale::Spinner), &slot);
        drop(slot);
        let received: Vec<_> = rx.iter().collect();
        assert_eq!(received, vec![(0, ProgressSnapshot::Complete)]);
    }

    #[test]
    fn test_monitor_reads_fifo_and_unlinks_it() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("01-frames.progress");
        let feed = ProgressFeed::create(path.clone(), ProgressScale::Known(1.0)).unwrap();
        let (slot, rx) = test_slot(0);
        let monitor = ProgressMonitor::start(feed, slot).unwrap();
        assert_eq!(monitor.feed_path(), Some(path.as_path()));

        // Stand-in for the stage: open, write, close.
        let mut writer = OpenOptions::new().write(true).open(&path).unwrap();
        writer.write_all(b"out_time_ms=1000000\nprogress=end\n").unwrap();
        drop(writer);

        assert_eq!(monitor.finish(), 1);
        assert!(!path.exists());
        let received: Vec<_> = rx.iter().map(|(_, s)| s).collect();
        assert_eq!(received.last(), Some(&ProgressSnapshot::Complete));
    }

    #[test]
    fn test_monitor_finishes_when_stage_never_writes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("01-crop.progress");
        let feed = ProgressFeed::create(path.clone(), ProgressScale::Nominal).unwrap();
        let (slot, _rx) = test_slot(0);
        let monitor = ProgressMonitor::start(feed, slot).unwrap();
        assert_eq!(monitor.finish(), 0);
        assert!(!path.exists());
    }
}
