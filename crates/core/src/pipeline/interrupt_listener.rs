use std::io;
use std::thread::{self, JoinHandle};

use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
use signal_hook::iterator::{Handle, Signals};

use crate::stage::infrastructure::process_group::ProcessGroup;

/// Cancels a running pipeline exactly as a termination signal would.
#[derive(Clone, Debug)]
pub struct CancelHandle {
    group: ProcessGroup,
}

impl CancelHandle {
    pub(crate) fn new(group: ProcessGroup) -> Self {
        Self { group }
    }

    pub fn cancel(&self) {
        self.group.terminate();
    }

    pub fn is_cancelled(&self) -> bool {
        self.group.is_cancelled()
    }
}

/// Turns SIGINT, SIGTERM and SIGHUP into a cancellation for the lifetime of
/// one run. Closed and joined on drop.
pub struct InterruptListener {
    handle: Handle,
    thread: Option<JoinHandle<()>>,
}

impl InterruptListener {
    pub fn install(cancel: CancelHandle) -> io::Result<Self> {
        let mut signals = Signals::new([SIGINT, SIGTERM, SIGHUP])?;
        let handle = signals.handle();
        let thread = thread::Builder::new()
            .name("interrupt-listener".to_string())
            .spawn(move || {
                for signal in signals.forever() {
                    log::info!("Received signal {signal}, stopping pipeline");
                    cancel.cancel();
                }
            })?;
        log::debug!("Interrupt listener installed");
        Ok(Self {
            handle,
            thread: Some(thread),
        })
    }
}

impl Drop for InterruptListener {
    fn drop(&mut self) {
        self.handle.close();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::warn!("Interrupt listener thread panicked");
            }
        }
    }
}
