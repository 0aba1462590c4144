use std::io::{self, Write};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};

use crate::progress::domain::progress_tracker::ProgressSnapshot;
use crate::shared::constants::PROGRESS_BAR_WIDTH;

const SPINNER: [char; 4] = ['|', '/', '-', '\\'];
const SLOT_SEPARATOR: &str = "  ";

struct BoardMessage {
    slot: usize,
    snapshot: ProgressSnapshot,
}

/// Handle a monitor uses to publish snapshots for one stage.
#[derive(Clone)]
pub struct BoardSlot {
    index: usize,
    tx: Sender<BoardMessage>,
}

impl BoardSlot {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn send(&self, snapshot: ProgressSnapshot) {
        // A closed board only means nobody is watching.
        let _ = self.tx.send(BoardMessage {
            slot: self.index,
            snapshot,
        });
    }
}

/// Single owner of the diagnostic stream while stages run.
///
/// Every concurrently running stage gets a slot; the render thread draws
/// all slots on one `\r`-refreshed line and ends the line once every slot
/// has completed.
pub struct ProgressBoard {
    tx: Option<Sender<BoardMessage>>,
    slots: usize,
    thread: Option<JoinHandle<()>>,
}

impl ProgressBoard {
    pub fn spawn<W>(labels: Vec<String>, out: W) -> io::Result<Self>
    where
        W: Write + Send + 'static,
    {
        let (tx, rx) = crossbeam_channel::unbounded::<BoardMessage>();
        let slots = labels.len();
        let thread = thread::Builder::new()
            .name("progress-board".to_string())
            .spawn(move || render_loop(BoardState::new(labels), rx, out))?;
        Ok(Self {
            tx: Some(tx),
            slots,
            thread: Some(thread),
        })
    }

    pub fn slot(&self, index: usize) -> Option<BoardSlot> {
        if index >= self.slots {
            return None;
        }
        self.tx.as_ref().map(|tx| BoardSlot {
            index,
            tx: tx.clone(),
        })
    }

    /// Waits for the render thread. Returns once every slot handle has been
    /// dropped.
    pub fn finish(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.tx.take();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::warn!("Progress render thread panicked");
            }
        }
    }
}

impl Drop for ProgressBoard {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn render_loop<W: Write>(mut state: BoardState, rx: Receiver<BoardMessage>, mut out: W) {
    for message in rx {
        state.update(message.slot, message.snapshot);
        if let Err(e) = state.draw(&mut out) {
            log::debug!("Progress rendering failed: {e}");
        }
    }
    if let Err(e) = state.close(&mut out) {
        log::debug!("Progress rendering failed: {e}");
    }
}

struct BoardState {
    slots: Vec<(String, Option<ProgressSnapshot>)>,
    last_width: usize,
    line_open: bool,
}

impl BoardState {
    fn new(labels: Vec<String>) -> Self {
        Self {
            slots: labels.into_iter().map(|l| (l, None)).collect(),
            last_width: 0,
            line_open: false,
        }
    }

    fn update(&mut self, slot: usize, snapshot: ProgressSnapshot) {
        if let Some(entry) = self.slots.get_mut(slot) {
            entry.1 = Some(snapshot);
        }
    }

    fn all_complete(&self) -> bool {
        self.slots
            .iter()
            .all(|(_, s)| matches!(s, Some(ProgressSnapshot::Complete)))
    }

    fn render_line(&self) -> String {
        self.slots
            .iter()
            .map(|(label, snapshot)| render_slot(label, snapshot.as_ref()))
            .collect::<Vec<_>>()
            .join(SLOT_SEPARATOR)
    }

    fn draw<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        let line = self.render_line();
        let width = line.chars().count();
        let pad = self.last_width.saturating_sub(width);
        write!(out, "\r{line}{}", " ".repeat(pad))?;
        self.last_width = width;
        self.line_open = true;
        if self.all_complete() {
            writeln!(out)?;
            self.line_open = false;
            self.last_width = 0;
        }
        out.flush()
    }

    fn close<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        if self.line_open {
            writeln!(out)?;
            self.line_open = false;
        }
        out.flush()
    }
}

fn render_slot(label: &str, snapshot: Option<&ProgressSnapshot>) -> String {
    match snapshot {
        None => format!("{label} waiting"),
        Some(ProgressSnapshot::Percent { percent, .. }) => {
            format!("{label} [{}] {percent:>3}%", bar(f64::from(*percent) / 100.0))
        }
        Some(ProgressSnapshot::Activity {
            fraction,
            elapsed_us,
        }) => format!("{label} [{}] {}", bar(*fraction), clock(*elapsed_us)),
        Some(ProgressSnapshot::Spinner { tick, elapsed_us }) => {
            format!("{label} {} {}", SPINNER[tick % SPINNER.len()], clock(*elapsed_us))
        }
        Some(ProgressSnapshot::Complete) => format!("{label} [{}] 100%", bar(1.0)),
    }
}

fn bar(fraction: f64) -> String {
    let filled = ((fraction.clamp(0.0, 1.0) * PROGRESS_BAR_WIDTH as f64).floor() as usize)
        .min(PROGRESS_BAR_WIDTH);
    format!(
        "{}{}",
        "#".repeat(filled),
        "-".repeat(PROGRESS_BAR_WIDTH - filled)
    )
}

fn clock(elapsed_us: u64) -> String {
    let secs = elapsed_us / 1_000_000;
    format!("{:02}:{:02}:{:02}", secs / 3600, secs / 60 % 60, secs % 60)
}

#[cfg(test)]
pub(crate) fn test_slot(index: usize) -> (BoardSlot, Receiver<(usize, ProgressSnapshot)>) {
    let (tx, rx) = crossbeam_channel::unbounded::<BoardMessage>();
    let (out_tx, out_rx) = crossbeam_channel::unbounded();
    thread::spawn(move || {
        for message in rx {
            let _ = out_tx.send((message.slot, message.snapshot));
        }
    });
    (BoardSlot { index, tx }, out_rx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn full_bar() -> String {
        "#".repeat(PROGRESS_BAR_WIDTH)
    }

    // ── Slot rendering ───────────────────────────────────────────────

    #[test]
    fn test_percent_bar_is_proportional() {
        let line = render_slot(
            "crop",
            Some(&ProgressSnapshot::Percent {
                percent: 50,
                elapsed_us: 0,
            }),
        );
        let half = PROGRESS_BAR_WIDTH / 2;
        let expected = format!(
            "crop [{}{}]  50%",
            "#".repeat(half),
            "-".repeat(PROGRESS_BAR_WIDTH - half)
        );
        assert_eq!(line, expected);
    }

    #[test]
    fn test_complete_is_full() {
        let line = render_slot("frames", Some(&ProgressSnapshot::Complete));
        assert_eq!(line, format!("frames [{}] 100%", full_bar()));
    }

    #[test]
    fn test_spinner_shows_clock() {
        let line = render_slot(
            "crop",
            Some(&ProgressSnapshot::Spinner {
                tick: 1,
                elapsed_us: 3_723_000_000,
            }),
        );
        assert_eq!(line, "crop / 01:02:03");
    }

    #[test]
    fn test_bar_clamps() {
        assert_eq!(bar(2.0), full_bar());
        assert_eq!(bar(-1.0), "-".repeat(PROGRESS_BAR_WIDTH));
    }

    // ── Board ────────────────────────────────────────────────────────

    #[test]
    fn test_board_ends_line_when_all_slots_complete() {
        let out = SharedBuffer::default();
        let board =
            ProgressBoard::spawn(vec!["crop".into(), "frames".into()], out.clone()).unwrap();
        let crop = board.slot(0).unwrap();
        let frames = board.slot(1).unwrap();
        assert!(board.slot(2).is_none());

        crop.send(ProgressSnapshot::Percent {
            percent: 10,
            elapsed_us: 1,
        });
        crop.send(ProgressSnapshot::Complete);
        frames.send(ProgressSnapshot::Complete);
        drop(crop);
        drop(frames);
        board.finish();

        let text = String::from_utf8(out.0.lock().unwrap().clone()).unwrap();
        assert!(text.starts_with("\rcrop ["));
        assert!(text.contains("frames waiting"));
        let last = text.rsplit('\r').next().unwrap();
        assert_eq!(
            last,
            format!("crop [{bar}] 100%  frames [{bar}] 100%\n", bar = full_bar())
        );
        assert_eq!(text.matches('\n').count(), 1);
    }

    #[test]
    fn test_board_closes_open_line() {
        let out = SharedBuffer::default();
        let board = ProgressBoard::spawn(vec!["crop".into()], out.clone()).unwrap();
        let slot = board.slot(0).unwrap();
        slot.send(ProgressSnapshot::Spinner {
            tick: 0,
            elapsed_us: 0,
        });
        drop(slot);
        board.finish();
        let text = String::from_utf8(out.0.lock().unwrap().clone()).unwrap();
        assert!(text.ends_with('\n'));
    }
}
