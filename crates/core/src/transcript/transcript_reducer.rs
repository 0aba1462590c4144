use std::io::{self, Write};

/// Collapses consecutive identical OCR lines and drops blank ones.
///
/// Lines are compared after trimming surrounding whitespace, using exact
/// string equality. Only the previous surviving line is remembered, so a
/// line that reappears later in the stream is kept again.
#[derive(Debug, Default)]
pub struct TranscriptReducer {
    previous: Option<String>,
}

impl TranscriptReducer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the trimmed line if it survives, `None` if it is dropped.
    pub fn accept(&mut self, line: &str) -> Option<&str> {
        let trimmed = line.trim();
        if trimmed.is_empty() || self.previous.as_deref() == Some(trimmed) {
            return None;
        }
        self.previous = Some(trimmed.to_string());
        self.previous.as_deref()
    }

    /// Convenience for reducing an in-memory list of lines.
    pub fn reduce<I, S>(lines: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut reducer = Self::new();
        lines
            .into_iter()
            .filter_map(|line| reducer.accept(line.as_ref()).map(str::to_string))
            .collect()
    }
}

/// Writes reduced transcript lines to a sink, optionally mirroring each
/// surviving line to a diagnostic writer.
pub struct TranscriptWriter<W: Write> {
    reducer: TranscriptReducer,
    sink: W,
    tee: Option<Box<dyn Write + Send>>,
    lines_written: usize,
}

impl<W: Write> TranscriptWriter<W> {
    pub fn new(sink: W, tee: Option<Box<dyn Write + Send>>) -> Self {
        Self {
            reducer: TranscriptReducer::new(),
            sink,
            tee,
            lines_written: 0,
        }
    }

    /// Feeds one OCR line. Returns whether it was written.
    pub fn push(&mut self, line: &str) -> io::Result<bool> {
        let Some(kept) = self.reducer.accept(line) else {
            return Ok(false);
        };
        writeln!(self.sink, "{kept}")?;
        if let Some(tee) = self.tee.as_mut() {
            writeln!(tee, "{kept}")?;
        }
        self.lines_written += 1;
        Ok(true)
    }

    pub fn lines_written(&self) -> usize {
        self.lines_written
    }

    /// Flushes both streams and returns the number of lines written.
    pub fn finish(mut self) -> io::Result<usize> {
        self.sink.flush()?;
        if let Some(tee) = self.tee.as_mut() {
            tee.flush()?;
        }
        Ok(self.lines_written)
    }
}
