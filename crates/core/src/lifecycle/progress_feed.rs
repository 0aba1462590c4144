use std::ffi::CString;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};

use crate::progress::domain::progress_tracker::ProgressScale;

/// A named pipe a stage writes progress records to, plus the scale used to
/// interpret them.
///
/// The FIFO is unlinked when the feed is dropped. Owners drop it only after
/// its reader has drained to end-of-stream.
#[derive(Debug)]
pub struct ProgressFeed {
    path: PathBuf,
    scale: ProgressScale,
}

/// Both ends of an attached feed.
///
/// `keepalive` is a write end held by the orchestrator: the stage may open
/// and close the FIFO at will without the reader seeing a premature
/// end-of-stream. Dropping it after the stage exits delivers the one and
/// only end-of-stream.
#[derive(Debug)]
pub struct FeedEnds {
    pub reader: File,
    pub keepalive: File,
}

impl ProgressFeed {
    pub(crate) fn create(path: PathBuf, scale: ProgressScale) -> io::Result<Self> {
        let c_path = CString::new(path.as_os_str().as_bytes())?;
        // SAFETY: c_path is a valid NUL-terminated string for the call.
        let rc = unsafe { libc::mkfifo(c_path.as_ptr(), 0o600) };
        if rc != 0 {
            return Err(io::Error::last_os_error());
        }
        log::debug!("Created progress feed {}", path.display());
        Ok(Self { path, scale })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn scale(&self) -> ProgressScale {
        self.scale
    }

    /// Opens the read end without blocking, then a keep-alive write end.
    ///
    /// Must be called before the writing stage is spawned so the stage's
    /// own open never blocks waiting for a reader.
    pub fn attach(&self) -> io::Result<FeedEnds> {
        let reader = OpenOptions::new()
            .read(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(&self.path)?;
        set_blocking(&reader)?;
        let keepalive = OpenOptions::new().write(true).open(&self.path)?;
        Ok(FeedEnds { reader, keepalive })
    }
}

impl Drop for ProgressFeed {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => log::debug!("Removed progress feed {}", self.path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => log::warn!("Failed to remove {}: {e}", self.path.display()),
        }
    }
}

fn set_blocking(file: &File) -> io::Result<()> {
    let fd = file.as_raw_fd();
    // SAFETY: fd is owned by `file` and stays open for both calls.
    let flags = unsafe { libc::fcntl(fd, libc::F_GETFL) };
    if flags < 0 {
        return Err(io::Error::last_os_error());
    }
    // SAFETY: as above.
    if unsafe { libc::fcntl(fd, libc::F_SETFL, flags & !libc::O_NONBLOCK) } < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}
