//! Concatenate many sources into one output stream.

use crate::error::FastxError;
use crate::filter::RecordFilter;
use crate::policy::MergeOptions;
use crate::reader::{FastxReader, Source};
use crate::record::Format;
use crate::writer::FastxWriter;

use std::io::Write;
use std::path::Path;
use thiserror::Error;

/// Why a source contributed nothing (or only part of its records).
#[derive(Debug, Error)]
pub enum SkipReason {
    #[error("format cannot be inferred from the file name")]
    UnknownFormat,
    #[error("{found} input does not match the selected {expected} format")]
    FormatMismatch { expected: Format, found: Format },
    #[error(transparent)]
    Failed(FastxError),
}

#[derive(Debug)]
pub struct SkippedSource {
    pub name: String,
    pub reason: SkipReason,
    /// Records written from this source before it failed. They stay in the
    /// output.
    pub records_kept: u64,
}

impl SkippedSource {
    /// True when the source failed after some of its records were written.
    pub fn is_partial(&self) -> bool {
        self.records_kept > 0
    }
}

#[derive(Debug, Default)]
pub struct MergeSummary {
    pub records_written: u64,
    /// Records dropped by the filter.
    pub records_rejected: u64,
    pub sources_merged: usize,
    pub skipped: Vec<SkippedSource>,
}

/// Merge `sources` in order into `output`.
///
/// A source that cannot be opened or parsed is skipped and reported in the
/// summary. Records it produced before failing stay in the output and are
/// counted in [`SkippedSource::records_kept`]. Only failures to write
/// `output` abort the run.
pub fn merge<I, W>(sources: I, opts: &MergeOptions, output: W) -> Result<MergeSummary, FastxError>
where
    I: IntoIterator<Item = Source>,
    W: Write,
{
    let writer = FastxWriter::new(output, opts.format, opts.compressed);
    merge_into(sources, opts, writer)
}

/// Merge into a newly created file at `path`.
pub fn merge_to_path<I, P>(sources: I, opts: &MergeOptions, path: P) -> Result<MergeSummary, FastxError>
where
    I: IntoIterator<Item = Source>,
    P: AsRef<Path>,
{
    let writer = FastxWriter::create(path, opts.format, opts.compressed)?;
    merge_into(sources, opts, writer)
}

fn merge_into<I, W>(
    sources: I,
    opts: &MergeOptions,
    mut writer: FastxWriter<W>,
) -> Result<MergeSummary, FastxError>
where
    I: IntoIterator<Item = Source>,
    W: Write,
{
    let filter = match opts.format {
        Some(_) => &opts.filter,
        None => {
            if !opts.filter.is_empty() {
                log::warn!("filter patterns need an explicit format; merging without filtering");
            }
            &NO_FILTER
        }
    };

    let mut summary = MergeSummary::default();
    for source in sources {
        let name = source.name();
        let format = match resolve_format(opts.format, source.format_hint()) {
            Ok(f) => f,
            Err(reason) => {
                skip(&mut summary, name, reason, 0);
                continue;
            }
        };

        let reader = match source.open(format) {
            Ok(r) => r,
            Err(e) => {
                skip(&mut summary, name, SkipReason::Failed(e), 0);
                continue;
            }
        };
        let before = writer.records_written();
        match copy_records(reader, filter, &mut writer, &mut summary) {
            Ok(()) => summary.sources_merged += 1,
            Err(e) if e.is_write_error() => return Err(e),
            Err(e) => {
                let kept = writer.records_written() - before;
                skip(&mut summary, name, SkipReason::Failed(e), kept);
            }
        }
    }

    summary.records_written = writer.records_written();
    log::info!(
        "merged {} records from {} sources ({} rejected, {} sources skipped)",
        summary.records_written,
        summary.sources_merged,
        summary.records_rejected,
        summary.skipped.len()
    );
    writer.finish()?;
    Ok(summary)
}

static NO_FILTER: RecordFilter = RecordFilter::empty();

fn resolve_format(selected: Option<Format>, hint: Option<Format>) -> Result<Format, SkipReason> {
    match (selected, hint) {
        (Some(expected), Some(found)) if expected != found => {
            Err(SkipReason::FormatMismatch { expected, found })
        }
        (Some(f), _) | (None, Some(f)) => Ok(f),
        (None, None) => Err(SkipReason::UnknownFormat),
    }
}

// The reader is dropped, and its stream closed, before the next source opens.
fn copy_records<W: Write>(
    mut reader: FastxReader,
    filter: &RecordFilter,
    writer: &mut FastxWriter<W>,
    summary: &mut MergeSummary,
) -> Result<(), FastxError> {
    while let Some(rec) = reader.read_record() {
        let rec = rec?;
        if !filter.accepts(&rec) {
            summary.records_rejected += 1;
            continue;
        }
        writer.write_record(&rec)?;
    }
    reader.close();
    Ok(())
}

fn skip(summary: &mut MergeSummary, name: String, reason: SkipReason, records_kept: u64) {
    if records_kept > 0 {
        log::warn!("skipping rest of {name} after {records_kept} records: {reason}");
    } else {
        log::warn!("skipping {name}: {reason}");
    }
    summary.skipped.push(SkippedSource {
        name,
        reason,
        records_kept,
    });
}
