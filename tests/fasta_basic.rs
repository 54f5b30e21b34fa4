use fastx_split_merge::{FastxError, FastxReader, Format, FormatError, Record};
use std::io::{BufReader, Cursor};

fn read_all(data: &str) -> Result<Vec<Record>, FastxError> {
    FastxReader::from_bufread(Cursor::new(data.to_string()), Format::Fasta).collect()
}

#[test]
fn multi_line_sequences_are_joined() {
    let recs = read_all(">seq1\nACGT\nACGT\n>seq2\nTTTT\n").unwrap();
    assert_eq!(recs, vec![Record::fasta("seq1", "ACGTACGT"), Record::fasta("seq2", "TTTT")]);
}

#[test]
fn header_keeps_description() {
    let recs = read_all(">Boophis anulatus, Tanzania\nAC\n\nGT\n").unwrap();
    assert_eq!(recs.len(), 1);
    assert_eq!(recs[0].id(), "Boophis anulatus, Tanzania");
    assert_eq!(recs[0].name(), "Boophis");
    assert_eq!(recs[0].seq(), b"ACGT");
    assert_eq!(recs[0].qual(), None);
}

#[test]
fn leading_blank_lines_and_missing_final_newline() {
    let recs = read_all("\n\n>a\nAC\r\nGT").unwrap();
    assert_eq!(recs, vec![Record::fasta("a", "ACGT")]);
}

#[test]
fn header_without_sequence_lines() {
    let recs = read_all(">a\n>b\nTT\n").unwrap();
    assert_eq!(recs, vec![Record::fasta("a", ""), Record::fasta("b", "TT")]);
}

#[test]
fn content_before_first_header_is_rejected() {
    let err = read_all("ACGT\n>a\nTT\n").unwrap_err();
    assert!(matches!(
        err,
        FastxError::Format {
            source: FormatError::MissingHeader { expected: '>' },
            ..
        }
    ));
}

#[test]
fn fastq_input_in_fasta_mode() {
    let err = read_all("@r1\nACGT\n+\n!!!!\n").unwrap_err();
    assert!(matches!(
        err,
        FastxError::Format {
            source: FormatError::FastqHeaderDetected,
            ..
        }
    ));
}

#[test]
fn empty_identifier_is_rejected() {
    let mut rdr = FastxReader::from_bufread(BufReader::new(&b">ok\nA\n> \nC\n"[..]), Format::Fasta);
    assert_eq!(rdr.next().unwrap().unwrap().id(), "ok");
    let err = rdr.next().unwrap().unwrap_err();
    assert!(matches!(
        err,
        FastxError::Format {
            source: FormatError::EmptyId,
            ..
        }
    ));
    assert!(rdr.next().is_none());
}

#[test]
fn non_utf8_sequence_bytes_pass_through() {
    let data: &'static [u8] = b">x\nAC\xffGT\n";
    let rec = FastxReader::from_bufread(BufReader::new(data), Format::Fasta)
        .next()
        .unwrap()
        .unwrap();
    assert_eq!(rec.seq(), b"AC\xffGT");
}

#[test]
fn empty_stream_is_not_an_error() {
    assert!(read_all("").unwrap().is_empty());
    assert!(read_all("\n\n").unwrap().is_empty());
}
