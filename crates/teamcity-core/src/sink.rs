// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Line-based output destinations for service messages

use std::io::{self, Write};

/// An append-only destination receiving one service message per call
pub trait Sink {
    /// Append one line (without its terminator)
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the line cannot be written.
    fn emit(&mut self, line: &str) -> io::Result<()>;
}

/// Collects lines in memory
impl Sink for Vec<String> {
    fn emit(&mut self, line: &str) -> io::Result<()> {
        self.push(line.to_string());
        Ok(())
    }
}

impl<S: Sink + ?Sized> Sink for &mut S {
    fn emit(&mut self, line: &str) -> io::Result<()> {
        (**self).emit(line)
    }
}

/// Writes newline-terminated lines to any [`Write`] implementation
///
/// Each line is flushed immediately so the CI server sees progress while the
/// run is still going.
#[derive(Debug)]
pub struct WriterSink<W: Write> {
    writer: W,
}

impl<W: Write> WriterSink<W> {
    /// Wrap a writer
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Recover the wrapped writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Sink for WriterSink<W> {
    fn emit(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.writer, "{line}")?;
        self.writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_sink_collects() {
        let mut lines: Vec<String> = Vec::new();
        lines.emit("one").unwrap();
        lines.emit("two").unwrap();
        assert_eq!(lines, vec!["one", "two"]);
    }

    #[test]
    fn test_writer_sink_terminates_lines() {
        let mut sink = WriterSink::new(Vec::new());
        sink.emit("##teamcity[testStarted name='a']").unwrap();
        sink.emit("second").unwrap();
        let written = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(written, "##teamcity[testStarted name='a']\nsecond\n");
    }
}
