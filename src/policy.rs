use crate::error::FastxError;
use crate::filter::RecordFilter;
use crate::record::Format;

/// How the splitter distributes records over output partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SplitPolicy {
    /// Everything goes to a single partition.
    #[default]
    Whole,
    /// Round-robin over this many partitions.
    ByCount(usize),
    /// Start a new partition before the current one would exceed this many bytes.
    ByMaxSize(u64),
}

impl SplitPolicy {
    pub fn validate(self) -> Result<Self, FastxError> {
        match self {
            SplitPolicy::ByCount(0) => Err(FastxError::Policy("partition count must be positive".into())),
            SplitPolicy::ByMaxSize(0) => Err(FastxError::Policy("maximum size must be positive".into())),
            p => Ok(p),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MergeOptions {
    /// Explicit input format. Unset means per-source inference and no filtering.
    pub format: Option<Format>,
    pub filter: RecordFilter,
    pub compressed: bool,
}

#[derive(Debug, Clone)]
pub struct SplitOptions {
    pub format: Format,
    pub filter: RecordFilter,
    pub policy: SplitPolicy,
    pub compressed: bool,
    /// FASTA line wrapping in the outputs. `None` keeps each sequence on one line.
    pub line_width: Option<usize>,
}

impl SplitOptions {
    pub fn new(format: Format, policy: SplitPolicy) -> Self {
        Self {
            format,
            filter: RecordFilter::default(),
            policy,
            compressed: false,
            line_width: None,
        }
    }
}

/// Parse a size such as `512`, `100b`, `10k`, `3M` or `1g` (powers of 1024).
pub fn parse_size(s: &str) -> Result<u64, FastxError> {
    let s = s.trim();
    let invalid = || FastxError::Policy(format!("invalid size '{s}'"));
    let (num, power) = match s.char_indices().last() {
        Some((i, c)) if c.is_ascii_alphabetic() => {
            let power = match c.to_ascii_lowercase() {
                'b' => 0,
                'k' => 1,
                'm' => 2,
                'g' => 3,
                _ => return Err(invalid()),
            };
            (&s[..i], power)
        }
        Some(_) => (s, 0),
        None => return Err(invalid()),
    };
    let n: u64 = num.trim().parse().map_err(|_| invalid())?;
    n.checked_mul(1024u64.pow(power)).ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_with_suffixes() {
        assert_eq!(parse_size("512").unwrap(), 512);
        assert_eq!(parse_size("100b").unwrap(), 100);
        assert_eq!(parse_size("10k").unwrap(), 10 * 1024);
        assert_eq!(parse_size("3M").unwrap(), 3 * 1024 * 1024);
        assert_eq!(parse_size("1g").unwrap(), 1024 * 1024 * 1024);
        assert!(parse_size("").is_err());
        assert!(parse_size("k").is_err());
        assert!(parse_size("10x").is_err());
        assert!(parse_size("-5k").is_err());
    }

    #[test]
    fn zero_policies_rejected() {
        assert!(SplitPolicy::ByCount(0).validate().is_err());
        assert!(SplitPolicy::ByMaxSize(0).validate().is_err());
        assert_eq!(SplitPolicy::ByCount(2).validate().unwrap(), SplitPolicy::ByCount(2));
    }
}
