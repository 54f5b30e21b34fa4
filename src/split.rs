//! Distribute the records of one source over several outputs.

use crate::error::FastxError;
use crate::filter::RecordFilter;
use crate::policy::{SplitOptions, SplitPolicy};
use crate::reader::{FastxReader, Source};
use crate::record::Record;
use crate::writer::FastxWriter;

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

/// One written output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partition {
    pub index: usize,
    pub records: u64,
    /// Uncompressed serialized size.
    pub bytes: u64,
}

/// Split `source` according to `opts.policy`.
///
/// `open_partition(i)` is called the first time partition `i` receives a
/// record, so no empty outputs are created. On error every writer still open
/// is dropped, which flushes it and closes its gzip frame.
pub fn split<W, F>(source: Source, opts: &SplitOptions, mut open_partition: F) -> Result<Vec<Partition>, FastxError>
where
    W: Write,
    F: FnMut(usize) -> io::Result<W>,
{
    let policy = opts.policy.validate()?;
    let mut reader = source.open(opts.format)?;
    log::debug!("splitting {} with {:?}", reader.name(), policy);

    let parts = match policy {
        SplitPolicy::Whole => round_robin(&mut reader, opts, 1, &mut open_partition)?,
        SplitPolicy::ByCount(n) => round_robin(&mut reader, opts, n, &mut open_partition)?,
        SplitPolicy::ByMaxSize(max) => by_size(&mut reader, opts, max, &mut open_partition)?,
    };
    log::info!(
        "split {} into {} partitions ({} records)",
        reader.name(),
        parts.len(),
        parts.iter().map(|p| p.records).sum::<u64>()
    );
    reader.close();
    Ok(parts)
}

/// Split into files named by `template`.
pub fn split_to_template(
    source: Source,
    opts: &SplitOptions,
    template: &OutputTemplate,
) -> Result<Vec<Partition>, FastxError> {
    split(source, opts, |i| template.open(i))
}

fn next_accepted(reader: &mut FastxReader, filter: &RecordFilter) -> Option<Result<Record, FastxError>> {
    reader.find(|r| r.as_ref().map_or(true, |rec| filter.accepts(rec)))
}

fn round_robin<W, F>(
    reader: &mut FastxReader,
    opts: &SplitOptions,
    n: usize,
    open_partition: &mut F,
) -> Result<Vec<Partition>, FastxError>
where
    W: Write,
    F: FnMut(usize) -> io::Result<W>,
{
    let mut writers: Vec<FastxWriter<W>> = Vec::with_capacity(n.min(64));
    let mut k = 0usize;
    while let Some(rec) = next_accepted(reader, &opts.filter) {
        let rec = rec?;
        let slot = k % n;
        if slot == writers.len() {
            writers.push(open_writer(opts, open_partition, slot)?);
        }
        writers[slot].write_record(&rec)?;
        k += 1;
    }
    writers
        .into_iter()
        .enumerate()
        .map(|(i, w)| close_writer(i, w))
        .collect()
}

fn by_size<W, F>(
    reader: &mut FastxReader,
    opts: &SplitOptions,
    max: u64,
    open_partition: &mut F,
) -> Result<Vec<Partition>, FastxError>
where
    W: Write,
    F: FnMut(usize) -> io::Result<W>,
{
    let mut done = Vec::new();
    let mut current: Option<FastxWriter<W>> = None;
    while let Some(rec) = next_accepted(reader, &opts.filter) {
        let rec = rec?;
        let w = match current.take() {
            Some(w) if w.bytes_written() + w.serialized_len(&rec) as u64 > max => {
                log::debug!("partition {} reached {} bytes", done.len(), w.bytes_written());
                done.push(close_writer(done.len(), w)?);
                open_writer(opts, open_partition, done.len())?
            }
            Some(w) => w,
            None => open_writer(opts, open_partition, done.len())?,
        };
        current.insert(w).write_record(&rec)?;
    }
    if let Some(w) = current {
        done.push(close_writer(done.len(), w)?);
    }
    Ok(done)
}

fn open_writer<W, F>(opts: &SplitOptions, open_partition: &mut F, index: usize) -> Result<FastxWriter<W>, FastxError>
where
    W: Write,
    F: FnMut(usize) -> io::Result<W>,
{
    let name = format!("partition {index}");
    let sink = open_partition(index).map_err(|e| FastxError::write_err(e, &name))?;
    let mut w = FastxWriter::new(sink, Some(opts.format), opts.compressed).with_name(name);
    if let Some(width) = opts.line_width {
        w = w.with_line_width(width);
    }
    log::debug!("opened partition {index}");
    Ok(w)
}

fn close_writer<W: Write>(index: usize, w: FastxWriter<W>) -> Result<Partition, FastxError> {
    let part = Partition {
        index,
        records: w.records_written(),
        bytes: w.bytes_written(),
    };
    w.finish()?;
    Ok(part)
}

/// Output file names for partitions. Every `#` is replaced by the index.
#[derive(Debug, Clone)]
pub struct OutputTemplate {
    template: String,
    gzip_suffix: bool,
}

impl OutputTemplate {
    /// A template without `#` gets `_#` before its extension, so
    /// `reads.fastq.gz` becomes `reads_#.fastq.gz`.
    pub fn new(template: impl Into<String>) -> Self {
        let template = template.into();
        let template = if template.contains('#') {
            template
        } else {
            insert_marker(&template)
        };
        Self {
            template,
            gzip_suffix: false,
        }
    }

    /// Append `.gz` to generated names that lack it.
    pub fn with_gzip_suffix(mut self, yes: bool) -> Self {
        self.gzip_suffix = yes;
        self
    }

    pub fn path_for(&self, index: usize) -> PathBuf {
        let mut s = self.template.replace('#', &index.to_string());
        if self.gzip_suffix && !s.ends_with(".gz") {
            s.push_str(".gz");
        }
        PathBuf::from(s)
    }

    pub fn open(&self, index: usize) -> io::Result<File> {
        File::create(self.path_for(index))
    }
}

fn insert_marker(template: &str) -> String {
    let name_start = template.rfind(['/', '\\']).map_or(0, |i| i + 1);
    let name = &template[name_start..];
    let stem = name.strip_suffix(".gz").unwrap_or(name);
    let stem_end = stem.rfind('.').filter(|&i| i > 0).unwrap_or(stem.len());
    let at = name_start + stem_end;
    format!("{}_#{}", &template[..at], &template[at..])
}
