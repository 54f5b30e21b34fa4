use fastx_split_merge::{FastxReader, FastxWriter, Format, Record, Source};
use flate2::Compression;
use flate2::write::GzEncoder;
use std::fs::File;
use std::io::{Cursor, Read, Write};
use tempfile::tempdir;

#[test]
fn parse_gz_file_single_record() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("sample.fastq.gz");
    {
        let f = File::create(&path).unwrap();
        let mut enc = GzEncoder::new(f, Compression::fast());
        writeln!(enc, "@x").unwrap();
        writeln!(enc, "ACGT").unwrap();
        writeln!(enc, "+").unwrap();
        writeln!(enc, "!!!!").unwrap();
        enc.finish().unwrap();
    }

    let mut fq = FastxReader::from_path(&path, Format::Fastq).expect("open gz");
    let rec = fq.next().unwrap().unwrap();
    assert_eq!(rec.id(), "x");
    assert_eq!(rec.seq(), b"ACGT");
    assert_eq!(rec.qual(), Some(&b"!!!!"[..]));
    assert!(fq.next().is_none());
}

#[test]
fn gzip_detected_by_magic_not_extension() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("plain_name.fas");
    {
        let mut enc = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        enc.write_all(b">a\nAC\nGT\n>b\nTT\n").unwrap();
        enc.finish().unwrap();
    }
    let recs: Vec<_> = FastxReader::from_path(&path, Format::Fasta)
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(recs, vec![Record::fasta("a", "ACGT"), Record::fasta("b", "TT")]);
}

#[test]
fn concatenated_gzip_members_are_read() {
    let mut data = Vec::new();
    for chunk in [&b">a\nAAAA\n"[..], &b">b\nCCCC\n"[..]] {
        let mut enc = GzEncoder::new(Vec::new(), Compression::fast());
        enc.write_all(chunk).unwrap();
        data.extend(enc.finish().unwrap());
    }
    let recs: Vec<_> = FastxReader::from_reader(Cursor::new(data), Format::Fasta)
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(recs.len(), 2);
    assert_eq!(recs[1].id(), "b");
}

#[test]
fn compressed_writer_output_reads_back() {
    let recs = vec![
        Record::fastq("r1 lane=1", "ACGT", "!!!!"),
        Record::fastq("r2", "GG", "##"),
    ];
    let mut w = FastxWriter::new(Vec::new(), Some(Format::Fastq), true);
    for r in &recs {
        w.write_record(r).unwrap();
    }
    let bytes = w.finish().unwrap();
    assert_eq!(&bytes[..2], &[0x1F, 0x8B]);

    let mut plain = String::new();
    flate2::read::GzDecoder::new(&bytes[..])
        .read_to_string(&mut plain)
        .unwrap();
    assert_eq!(plain, "@r1 lane=1\nACGT\n+\n!!!!\n@r2\nGG\n+\n##\n");

    let back: Vec<_> = Source::reader("mem.fq.gz", Cursor::new(bytes))
        .open(Format::Fastq)
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(back, recs);
}

#[test]
fn dropped_writer_still_closes_gzip_frame() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("out.fas.gz");
    {
        let mut w = FastxWriter::create(&path, Some(Format::Fasta), true).unwrap();
        w.write_record(&Record::fasta("a", "ACGT")).unwrap();
        // no finish(): simulates an aborted run
    }
    let recs: Vec<_> = FastxReader::from_path(&path, Format::Fasta)
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(recs, vec![Record::fasta("a", "ACGT")]);
}

/// Hands out one byte per `read`, like a slow pipe.
struct Trickle(Cursor<Vec<u8>>);

impl Read for Trickle {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = buf.len().min(1);
        self.0.read(&mut buf[..n])
    }
}

#[test]
fn gzip_reader_with_one_byte_reads() {
    let mut enc = GzEncoder::new(Vec::new(), Compression::default());
    enc.write_all(b">a\nACGT\n").unwrap();
    let packed = enc.finish().unwrap();

    let recs: Vec<_> = FastxReader::from_reader(Trickle(Cursor::new(packed)), Format::Fasta)
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(recs, vec![Record::fasta("a", "ACGT")]);

    let plain = Source::reader("pipe", Trickle(Cursor::new(b">b\nTT\n".to_vec())));
    let recs: Vec<_> = plain.open(Format::Fasta).unwrap().collect::<Result<_, _>>().unwrap();
    assert_eq!(recs, vec![Record::fasta("b", "TT")]);
}
