use crate::error::{FastxError, FormatError, IoContext};
use crate::record::{Format, Record};
use crate::util::{decode_if_gzip, open_file};

use std::fmt;
use std::io::{self, BufRead, Read};
use std::path::{Path, PathBuf};

/// A named input: a file on disk or any byte stream.
pub enum Source {
    Path(PathBuf),
    Reader {
        name: String,
        inner: Box<dyn Read + Send>,
    },
}

impl Source {
    pub fn reader<R: Read + Send + 'static>(name: impl Into<String>, inner: R) -> Self {
        Self::Reader {
            name: name.into(),
            inner: Box::new(inner),
        }
    }

    pub fn from_paths<I, P>(paths: I) -> Vec<Self>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        paths.into_iter().map(|p| Self::Path(p.into())).collect()
    }

    /// Identifier used in logs and skip reports.
    pub fn name(&self) -> String {
        match self {
            Source::Path(p) => p.display().to_string(),
            Source::Reader { name, .. } => name.clone(),
        }
    }

    /// Format implied by the file extension of the path or name.
    pub fn format_hint(&self) -> Option<Format> {
        match self {
            Source::Path(p) => Format::from_path(p),
            Source::Reader { name, .. } => Format::from_path(name),
        }
    }

    pub fn open(self, format: Format) -> Result<FastxReader, FastxError> {
        match self {
            Source::Path(p) => FastxReader::from_path(p, format),
            Source::Reader { name, inner } => {
                Ok(FastxReader::from_reader(inner, format)?.with_name(name))
            }
        }
    }
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Path(p) => f.debug_tuple("Path").field(p).finish(),
            Source::Reader { name, .. } => f.debug_struct("Reader").field("name", name).finish(),
        }
    }
}

/// Sync FASTA/FASTQ reader (plain/.gz), streaming.
///
/// Each call to [`FastxReader::read_record`] reads exactly the lines of one
/// record. Once the stream ends or a record fails to parse the reader is
/// exhausted and only returns `None`.
pub struct FastxReader {
    name: String,
    rdr: Box<dyn BufRead + Send>,
    format: Format,
    line_num: u64,
    byte_pos: u64,
    // FASTA records end at the next header, which is kept for the following call.
    pending_header: Option<Vec<u8>>,
    done: bool,
}

impl FastxReader {
    /// Open from a file path. Gzip is detected by magic bytes.
    pub fn from_path<P: AsRef<Path>>(path: P, format: Format) -> Result<Self, FastxError> {
        let path = path.as_ref();
        let f = open_file(path).map_err(|e| FastxError::open_err(e, path))?;

        #[cfg(feature = "mmap")]
        let raw = {
            use memmap2::Mmap;
            // Own the Mmap inside Cursor to avoid self-ref problems
            let mmap = unsafe { Mmap::map(&f) }.map_err(|e| FastxError::open_err(e, path))?;
            io::Cursor::new(mmap)
        };
        #[cfg(not(feature = "mmap"))]
        let raw = f;

        let rdr = decode_if_gzip(raw).map_err(|e| FastxError::open_err(e, path))?;
        Ok(Self::new(path.display().to_string(), rdr, format))
    }

    /// Wrap any `Read`, decompressing when it carries gzip.
    pub fn from_reader<R: Read + Send + 'static>(reader: R, format: Format) -> Result<Self, FastxError> {
        let rdr = decode_if_gzip(reader).map_err(|e| FastxError::io_err(e, IoContext::default()))?;
        Ok(Self::new("<reader>".to_string(), rdr, format))
    }

    /// Wrap an arbitrary `BufRead` of plain text (stdin, etc.).
    pub fn from_bufread<R: BufRead + Send + 'static>(reader: R, format: Format) -> Self {
        Self::new("<reader>".to_string(), Box::new(reader), format)
    }

    fn new(name: String, rdr: Box<dyn BufRead + Send>, format: Format) -> Self {
        Self {
            name,
            rdr,
            format,
            line_num: 0,
            byte_pos: 0,
            pending_header: None,
            done: false,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn format(&self) -> Format {
        self.format
    }

    /// Position reached so far.
    pub fn context(&self) -> IoContext {
        self.ctx()
    }

    /// Release the underlying stream.
    pub fn close(self) {
        log::trace!("closing {} after {} lines", self.name, self.line_num);
    }

    /// Next record, or `None` once the stream is exhausted.
    pub fn read_record(&mut self) -> Option<Result<Record, FastxError>> {
        if self.done {
            return None;
        }
        let res = match self.format {
            Format::Fasta => self.read_fasta(),
            Format::Fastq => self.read_fastq(),
        };
        match res {
            Ok(Some(rec)) => Some(Ok(rec)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }

    fn read_line(&mut self, buf: &mut Vec<u8>) -> io::Result<usize> {
        buf.clear();
        let n = self.rdr.read_until(b'\n', buf)?;
        if n > 0 {
            self.line_num += 1;
            self.byte_pos += n as u64;
            if buf.ends_with(b"\n") {
                buf.pop();
            }
            if buf.ends_with(b"\r") {
                buf.pop();
            }
        }
        Ok(n)
    }

    /// Pending header, or the first non-empty line. `None` at EOF.
    fn read_header(&mut self) -> Result<Option<Vec<u8>>, FastxError> {
        if let Some(h) = self.pending_header.take() {
            return Ok(Some(h));
        }
        let mut h = Vec::with_capacity(128);
        loop {
            let n = self
                .read_line(&mut h)
                .map_err(|e| FastxError::io_err(e, self.ctx()))?;
            if n == 0 {
                return Ok(None);
            }
            if !h.is_empty() {
                return Ok(Some(h));
            }
        }
    }

    fn parse_id(&self, header: &[u8]) -> Result<String, FastxError> {
        let sigil = self.format.sigil();
        match header.first().copied() {
            Some(c) if c == sigil => {}
            Some(b'>') => {
                return Err(FastxError::fmt_err(FormatError::FastaHeaderDetected, self.ctx()));
            }
            Some(b'@') => {
                return Err(FastxError::fmt_err(FormatError::FastqHeaderDetected, self.ctx()));
            }
            _ => {
                return Err(FastxError::fmt_err(
                    FormatError::MissingHeader {
                        expected: sigil as char,
                    },
                    self.ctx(),
                ));
            }
        }
        let id = std::str::from_utf8(&header[1..])
            .map_err(|_| FastxError::fmt_err(FormatError::InvalidHeader, self.ctx()))?;
        if id.trim().is_empty() {
            return Err(FastxError::fmt_err(FormatError::EmptyId, self.ctx()));
        }
        Ok(id.to_string())
    }

    fn read_fasta(&mut self) -> Result<Option<Record>, FastxError> {
        let Some(header) = self.read_header()? else {
            return Ok(None);
        };
        let id = self.parse_id(&header)?;

        let mut seq = Vec::<u8>::with_capacity(256);
        let mut line = Vec::with_capacity(256);
        loop {
            let n = self
                .read_line(&mut line)
                .map_err(|e| FastxError::io_err(e, self.ctx()))?;
            if n == 0 {
                break;
            }
            if line.first() == Some(&b'>') {
                self.pending_header = Some(std::mem::take(&mut line));
                break;
            }
            seq.extend_from_slice(&line);
        }
        Ok(Some(Record::fasta(id, seq)))
    }

    fn read_fastq(&mut self) -> Result<Option<Record>, FastxError> {
        let Some(header) = self.read_header()? else {
            return Ok(None);
        };
        let id = self.parse_id(&header)?;

        let mut line = Vec::with_capacity(256);

        // sequence: exactly one line
        self.read_required(&mut line)?;
        let seq = line.clone();

        // plus line
        self.read_required(&mut line)?;
        if !line.starts_with(b"+") {
            return Err(FastxError::fmt_err(FormatError::MissingPlus, self.ctx()));
        }

        // qual: exactly one line
        self.read_required(&mut line)?;
        let qual = std::mem::take(&mut line);

        Ok(Some(Record::fastq(id, seq, qual)))
    }

    /// Read a line that must exist to complete the current record.
    fn read_required(&mut self, line: &mut Vec<u8>) -> Result<(), FastxError> {
        let n = self
            .read_line(line)
            .map_err(|e| FastxError::io_err(e, self.ctx()))?;
        if n == 0 {
            return Err(FastxError::fmt_err(FormatError::UnexpectedEof, self.ctx()));
        }
        Ok(())
    }

    #[inline]
    fn ctx(&self) -> IoContext {
        IoContext {
            byte_pos: self.byte_pos,
            line_num: self.line_num,
        }
    }
}

impl Iterator for FastxReader {
    type Item = Result<Record, FastxError>;
    fn next(&mut self) -> Option<Self::Item> {
        self.read_record()
    }
}

impl std::iter::FusedIterator for FastxReader {}
