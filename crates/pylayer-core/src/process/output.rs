use std::io::Write;

use tracing::debug;

/// Diagnostic sink for subprocess output.
///
/// Each complete line becomes a `debug` event tagged with the stream it came
/// from. A trailing partial line is held until the next newline, a flush, or
/// drop.
pub struct DebugLogWriter {
    stream: &'static str,
    buffer: Vec<u8>,
}

impl DebugLogWriter {
    pub fn new(stream: &'static str) -> Self {
        Self {
            stream,
            buffer: Vec::new(),
        }
    }

    pub fn stdout() -> Self {
        Self::new("stdout")
    }

    pub fn stderr() -> Self {
        Self::new("stderr")
    }

    fn emit(&self, line: &[u8]) {
        let line = String::from_utf8_lossy(line);
        let line = line.trim_end_matches('\r');
        debug!(
            event = "core.process.output",
            stream = self.stream,
            line = %line
        );
    }

    #[cfg(test)]
    fn pending(&self) -> &[u8] {
        &self.buffer
    }
}

impl Write for DebugLogWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            self.emit(&line[..line.len() - 1]);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        if !self.buffer.is_empty() {
            let rest = std::mem::take(&mut self.buffer);
            self.emit(&rest);
        }
        Ok(())
    }
}

impl Drop for DebugLogWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}
