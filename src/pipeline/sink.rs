use crate::error::Result;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Pluggable output handler for the pipeline.
///
/// Receives either the final text (speech disabled) or the audio blocks
/// in order. Nothing is written until the first call, so a run that fails
/// before producing output leaves the destination untouched.
pub trait OutputSink: Send {
    /// Write the final text verbatim.
    fn write_text(&mut self, text: &str) -> Result<()>;

    /// Append one audio block.
    fn write_audio(&mut self, block: &[u8]) -> Result<()>;

    /// Flush everything. Called once after the last write.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }

    /// Name for logging/debugging.
    fn name(&self) -> &'static str {
        "sink"
    }
}

/// Writes text and audio to standard output.
pub struct StdoutSink;

impl OutputSink for StdoutSink {
    fn write_text(&mut self, text: &str) -> Result<()> {
        std::io::stdout().lock().write_all(text.as_bytes())?;
        Ok(())
    }

    fn write_audio(&mut self, block: &[u8]) -> Result<()> {
        std::io::stdout().lock().write_all(block)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        std::io::stdout().lock().flush()?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "stdout"
    }
}

/// Writes to a file, created (or truncated) on the first write.
pub struct FileSink {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            writer: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn writer(&mut self) -> Result<&mut BufWriter<File>> {
        let writer = match self.writer.take() {
            Some(writer) => writer,
            None => BufWriter::new(File::create(&self.path)?),
        };
        Ok(self.writer.insert(writer))
    }
}

impl OutputSink for FileSink {
    fn write_text(&mut self, text: &str) -> Result<()> {
        self.writer()?.write_all(text.as_bytes())?;
        Ok(())
    }

    fn write_audio(&mut self, block: &[u8]) -> Result<()> {
        self.writer()?.write_all(block)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if let Some(writer) = self.writer.as_mut() {
            writer.flush()?;
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "file"
    }
}

/// Collects output in memory for tests and library use.
#[derive(Debug, Default)]
pub struct CollectorSink {
    text: Option<String>,
    blocks: Vec<Vec<u8>>,
    finished: bool,
}

impl CollectorSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text written, if any.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Audio blocks in write order.
    pub fn blocks(&self) -> &[Vec<u8>] {
        &self.blocks
    }

    /// All audio bytes concatenated.
    pub fn audio(&self) -> Vec<u8> {
        self.blocks.concat()
    }

    /// True when nothing at all was written.
    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.blocks.is_empty()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl OutputSink for CollectorSink {
    fn write_text(&mut self, text: &str) -> Result<()> {
        self.text.get_or_insert_with(String::new).push_str(text);
        Ok(())
    }

    fn write_audio(&mut self, block: &[u8]) -> Result<()> {
        self.blocks.push(block.to_vec());
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.finished = true;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "collector"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_sink_is_object_safe() {
        let _sink: Box<dyn OutputSink> = Box::new(CollectorSink::new());
    }

    #[test]
    fn collector_keeps_blocks_in_order() {
        let mut sink = CollectorSink::new();
        sink.write_audio(b"one").unwrap();
        sink.write_audio(b"two").unwrap();
        sink.finish().unwrap();

        assert_eq!(sink.blocks(), &[b"one".to_vec(), b"two".to_vec()]);
        assert_eq!(sink.audio(), b"onetwo".to_vec());
        assert!(sink.is_finished());
        assert_eq!(sink.text(), None);
    }

    #[test]
    fn collector_starts_empty() {
        let sink = CollectorSink::new();
        assert!(sink.is_empty());
        assert!(!sink.is_finished());
    }

    #[test]
    fn file_sink_is_lazy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.mp3");
        let mut sink = FileSink::new(&path);

        sink.finish().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn file_sink_writes_blocks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.mp3");
        let mut sink = FileSink::new(&path);

        sink.write_audio(b"ID3").unwrap();
        sink.write_audio(b"\x00\x01").unwrap();
        sink.finish().unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"ID3\x00\x01".to_vec());
        assert_eq!(sink.path(), path.as_path());
    }

    #[test]
    fn file_sink_writes_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let mut sink = FileSink::new(&path);

        sink.write_text("Hello. World.").unwrap();
        sink.finish().unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "Hello. World.");
    }

    #[test]
    fn file_sink_reports_unwritable_path() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = FileSink::new(dir.path().join("missing").join("out.txt"));
        assert!(sink.write_text("x").is_err());
    }
}
