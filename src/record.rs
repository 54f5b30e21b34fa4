use std::fmt;
use std::path::Path;
use std::str::FromStr;

const FASTA_EXTS: &[&str] = &["fas", "fasta"];
const FASTQ_EXTS: &[&str] = &["fq", "fastq"];

/// Sequence file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Fasta,
    Fastq,
}

impl Format {
    /// Leading byte of a header line.
    #[inline]
    pub fn sigil(self) -> u8 {
        match self {
            Format::Fasta => b'>',
            Format::Fastq => b'@',
        }
    }

    /// Recognised file extensions, without the optional `.gz`.
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            Format::Fasta => FASTA_EXTS,
            Format::Fastq => FASTQ_EXTS,
        }
    }

    /// Infer the format from a file name, looking through a trailing `.gz`.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        let path = path.as_ref();
        let mut ext = path.extension().and_then(|s| s.to_str())?;
        if ext.eq_ignore_ascii_case("gz") {
            ext = Path::new(path.file_stem()?)
                .extension()
                .and_then(|s| s.to_str())?;
        }
        [Format::Fasta, Format::Fastq]
            .into_iter()
            .find(|f| f.extensions().iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Format::Fasta => "FASTA",
            Format::Fastq => "FASTQ",
        })
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fasta" | "fas" => Ok(Format::Fasta),
            "fastq" | "fq" => Ok(Format::Fastq),
            _ => Err(format!("unknown format '{s}', expected fasta or fastq")),
        }
    }
}

/// One FASTA or FASTQ entry. Only FASTQ records carry a quality string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    id: String,
    seq: Vec<u8>,
    qual: Option<Vec<u8>>,
}

impl Record {
    pub fn fasta(id: impl Into<String>, seq: impl Into<Vec<u8>>) -> Self {
        Self {
            id: id.into(),
            seq: seq.into(),
            qual: None,
        }
    }

    pub fn fastq(id: impl Into<String>, seq: impl Into<Vec<u8>>, qual: impl Into<Vec<u8>>) -> Self {
        Self {
            id: id.into(),
            seq: seq.into(),
            qual: Some(qual.into()),
        }
    }

    #[inline]
    pub fn format(&self) -> Format {
        if self.qual.is_some() {
            Format::Fastq
        } else {
            Format::Fasta
        }
    }

    /// Full header text after the `>`/`@` sigil.
    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Header text up to the first whitespace.
    pub fn name(&self) -> &str {
        self.id.split(char::is_whitespace).next().unwrap_or("")
    }

    #[inline]
    pub fn seq(&self) -> &[u8] {
        &self.seq
    }

    #[inline]
    pub fn qual(&self) -> Option<&[u8]> {
        self.qual.as_deref()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.seq.len()
    }
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.seq.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_from_extension() {
        assert_eq!(Format::from_path("a/b.fas"), Some(Format::Fasta));
        assert_eq!(Format::from_path("b.FASTA.gz"), Some(Format::Fasta));
        assert_eq!(Format::from_path("reads.fq.gz"), Some(Format::Fastq));
        assert_eq!(Format::from_path("reads.fastq"), Some(Format::Fastq));
        assert_eq!(Format::from_path("notes.txt"), None);
        assert_eq!(Format::from_path("archive.gz"), None);
        assert_eq!(Format::from_path("noext"), None);
    }

    #[test]
    fn name_stops_at_whitespace() {
        let rec = Record::fasta("Boophis anulatus, Tanzania", "ACGT");
        assert_eq!(rec.name(), "Boophis");
        assert_eq!(rec.id(), "Boophis anulatus, Tanzania");
        assert_eq!(rec.format(), Format::Fasta);
        assert_eq!(rec.qual(), None);
    }
}
