use crate::error::{FastxError, FormatError, IoContext};
use crate::record::{Format, Record};
use crate::util::BUF_CAPACITY;

use flate2::Compression;
use flate2::write::GzEncoder;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

enum Sink<W: Write> {
    Plain(BufWriter<W>),
    Gzip(GzEncoder<BufWriter<W>>),
}

impl<W: Write> Write for Sink<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Sink::Plain(w) => w.write(buf),
            Sink::Gzip(w) => w.write(buf),
        }
    }
    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        match self {
            Sink::Plain(w) => w.write_all(buf),
            Sink::Gzip(w) => w.write_all(buf),
        }
    }
    fn flush(&mut self) -> io::Result<()> {
        match self {
            Sink::Plain(w) => w.flush(),
            Sink::Gzip(w) => w.flush(),
        }
    }
}

/// Streaming FASTA/FASTQ writer, optionally gzip-compressed.
///
/// Call [`FastxWriter::finish`] to flush and surface errors. A writer that is
/// dropped unfinished still flushes its buffer and writes the gzip trailer,
/// ignoring errors, so aborted runs leave readable output behind.
pub struct FastxWriter<W: Write> {
    sink: Sink<W>,
    name: String,
    format: Option<Format>,
    line_width: Option<usize>,
    records_written: u64,
    bytes_written: u64,
}

impl FastxWriter<File> {
    /// Create (truncate) a file at `path`.
    pub fn create<P: AsRef<Path>>(path: P, format: Option<Format>, compressed: bool) -> Result<Self, FastxError> {
        let path = path.as_ref();
        let f = File::create(path).map_err(|e| FastxError::open_err(e, path))?;
        Ok(Self::new(f, format, compressed).with_name(path.display().to_string()))
    }
}

impl<W: Write> FastxWriter<W> {
    /// With `format == None` every record is written in its own format.
    pub fn new(inner: W, format: Option<Format>, compressed: bool) -> Self {
        let buffered = BufWriter::with_capacity(BUF_CAPACITY, inner);
        let sink = if compressed {
            Sink::Gzip(GzEncoder::new(buffered, Compression::default()))
        } else {
            Sink::Plain(buffered)
        };
        Self {
            sink,
            name: "<output>".to_string(),
            format,
            line_width: None,
            records_written: 0,
            bytes_written: 0,
        }
    }

    /// Sink identifier reported in write errors.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Wrap FASTA sequence lines at `width` bytes. Zero disables wrapping.
    pub fn with_line_width(mut self, width: usize) -> Self {
        self.line_width = (width > 0).then_some(width);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    /// Uncompressed bytes written so far.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Uncompressed size `rec` would take in this writer.
    pub fn serialized_len(&self, rec: &Record) -> usize {
        let header = 1 + rec.id().len() + 1;
        match rec.qual() {
            Some(qual) => header + rec.len() + 1 + 2 + qual.len() + 1,
            None => {
                let breaks = match self.line_width {
                    Some(w) if !rec.is_empty() => rec.len().div_ceil(w),
                    _ => 1,
                };
                header + rec.len() + breaks
            }
        }
    }

    /// Append one record, returning its serialized size.
    pub fn write_record(&mut self, rec: &Record) -> Result<usize, FastxError> {
        if let Some(expected) = self.format {
            if expected != rec.format() {
                return Err(FastxError::fmt_err(
                    FormatError::RecordMismatch {
                        expected,
                        found: rec.format(),
                    },
                    IoContext::default(),
                ));
            }
        }
        let len = self.serialized_len(rec);
        self.write_raw(rec)
            .map_err(|e| FastxError::write_err(e, &self.name))?;
        self.records_written += 1;
        self.bytes_written += len as u64;
        Ok(len)
    }

    fn write_raw(&mut self, rec: &Record) -> io::Result<()> {
        let w = &mut self.sink;
        match rec.qual() {
            Some(qual) => {
                w.write_all(b"@")?;
                w.write_all(rec.id().as_bytes())?;
                w.write_all(b"\n")?;
                w.write_all(rec.seq())?;
                w.write_all(b"\n+\n")?;
                w.write_all(qual)?;
                w.write_all(b"\n")
            }
            None => {
                w.write_all(b">")?;
                w.write_all(rec.id().as_bytes())?;
                w.write_all(b"\n")?;
                match self.line_width {
                    Some(width) if !rec.is_empty() => {
                        for chunk in rec.seq().chunks(width) {
                            w.write_all(chunk)?;
                            w.write_all(b"\n")?;
                        }
                        Ok(())
                    }
                    _ => {
                        w.write_all(rec.seq())?;
                        w.write_all(b"\n")
                    }
                }
            }
        }
    }

    /// Flush, finalise the gzip frame and hand back the inner sink.
    pub fn finish(self) -> Result<W, FastxError> {
        let name = self.name;
        let buffered = match self.sink {
            Sink::Plain(w) => w,
            Sink::Gzip(enc) => enc.finish().map_err(|e| FastxError::write_err(e, &name))?,
        };
        buffered
            .into_inner()
            .map_err(|e| FastxError::write_err(e.into_error(), &name))
    }
}
