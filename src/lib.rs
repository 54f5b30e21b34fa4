//! Streaming merge and split of FASTA/FASTQ files.
//!
//! - Plain and `.gz` input (auto-detect by magic bytes), optional gzip output.
//! - Streaming, record-by-record (no full-file buffering).
//! - Multi-line FASTA, strict 4-line FASTQ.
//! - Boolean filter patterns (`"a" and not ("b" or "c")`) over ids and sequences.
//! - Merge: many sources into one output, malformed sources skipped and reported.
//! - Split: one source into partitions by count (round-robin) or by size budget.
//! - Optional `mmap` for plain files; `zlib` feature for system-zlib parity.

pub mod error;
pub mod filter;
pub mod merge;
pub mod policy;
pub mod reader;
pub mod record;
pub mod split;
mod util;
pub mod writer;

pub use crate::error::{FastxError, FormatError, IoContext, SyntaxError};
pub use crate::filter::{FilterExpr, MAX_NESTING, RecordFilter};
pub use crate::merge::{MergeSummary, SkipReason, SkippedSource, merge, merge_to_path};
pub use crate::policy::{MergeOptions, SplitOptions, SplitPolicy, parse_size};
pub use crate::reader::{FastxReader, Source};
pub use crate::record::{Format, Record};
pub use crate::split::{OutputTemplate, Partition, split, split_to_template};
pub use crate::util::{expand_inputs, looks_like_gzip};
pub use crate::writer::FastxWriter;
