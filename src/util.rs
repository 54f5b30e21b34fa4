use crate::error::FastxError;

use flate2::bufread::MultiGzDecoder;
use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

pub(crate) const BUF_CAPACITY: usize = 256 * 1024;

const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];

/// True when `head` starts with the gzip magic bytes.
pub fn looks_like_gzip(head: &[u8]) -> bool {
    head.starts_with(&GZIP_MAGIC)
}

/// Read the first bytes of `r` and wrap it in a gzip decoder when they carry
/// the gzip magic. The sniffed bytes are put back in front of the stream.
pub(crate) fn decode_if_gzip<R>(mut r: R) -> io::Result<Box<dyn BufRead + Send>>
where
    R: Read + Send + 'static,
{
    // `take(..).read_to_end` keeps reading short chunks until 2 bytes or EOF
    let mut head = Vec::with_capacity(GZIP_MAGIC.len());
    (&mut r).take(GZIP_MAGIC.len() as u64).read_to_end(&mut head)?;
    let gzip = looks_like_gzip(&head);

    let buffered = BufReader::with_capacity(BUF_CAPACITY, io::Cursor::new(head).chain(r));
    if gzip {
        let dec = MultiGzDecoder::new(buffered);
        Ok(Box::new(BufReader::with_capacity(BUF_CAPACITY, dec)))
    } else {
        Ok(Box::new(buffered))
    }
}

pub fn open_file(path: &Path) -> io::Result<File> {
    std::fs::File::open(path)
}

/// Resolve a mix of file and directory paths into a flat file list.
///
/// Files are kept in the given order. Directories are walked recursively and
/// their entries visited in lexical order. A directory reached twice (through
/// a symlink cycle or a repeated argument) is walked once. Paths that do not
/// exist are skipped with a warning.
pub fn expand_inputs<I, P>(paths: I) -> Result<Vec<PathBuf>, FastxError>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut out = Vec::new();
    let mut seen_dirs = HashSet::new();
    for path in paths {
        collect_files(path.as_ref(), &mut seen_dirs, &mut out)?;
    }
    Ok(out)
}

fn collect_files(
    path: &Path,
    seen_dirs: &mut HashSet<PathBuf>,
    out: &mut Vec<PathBuf>,
) -> Result<(), FastxError> {
    if path.is_dir() {
        let canonical = path.canonicalize().map_err(|e| FastxError::open_err(e, path))?;
        if !seen_dirs.insert(canonical) {
            log::debug!("directory '{}' already visited", path.display());
            return Ok(());
        }
        let mut entries = std::fs::read_dir(path)
            .and_then(|rd| rd.map(|e| e.map(|e| e.path())).collect::<io::Result<Vec<_>>>())
            .map_err(|e| FastxError::open_err(e, path))?;
        entries.sort();
        for entry in entries {
            collect_files(&entry, seen_dirs, out)?;
        }
    } else if path.exists() {
        out.push(path.to_path_buf());
    } else {
        log::warn!("skipping missing input '{}'", path.display());
    }
    Ok(())
}
