use cur_ingest::io::compression::{
    auto_detect_reader, auto_detect_writer, codecs, compressed_extensions, detect_from_extension,
};
use cur_ingest::testing::{CurFileBuilder, sample_header, sample_rows};
use cur_ingest::CurParser;
use std::fs::File;
use std::io::{Read, Write};
use tempfile::tempdir;

const TEXT: &str = "lineItem/ProductCode,lineItem/UnblendedCost\nAmazonEC2,1.5\n";

fn round_trip(file_name: &str) -> anyhow::Result<String> {
    let dir = tempdir()?;
    let path = dir.path().join(file_name);
    {
        let mut w = auto_detect_writer(File::create(&path)?, &path)?;
        w.write_all(TEXT.as_bytes())?;
        w.flush()?;
    }
    let mut out = String::new();
    auto_detect_reader(File::open(&path)?, &path)?.read_to_string(&mut out)?;
    Ok(out)
}

#[test]
fn every_codec_is_registered() {
    let names: Vec<_> = codecs().iter().map(|c| c.name()).collect();
    assert_eq!(names, ["gzip", "zstd", "bzip2", "xz"]);
    let exts: Vec<_> = compressed_extensions().collect();
    assert!(exts.contains(&".gz"));
    assert!(exts.contains(&".zst"));
}

#[test]
fn detection_is_by_extension() {
    assert_eq!(detect_from_extension("a/report.csv.gz").map(|c| c.name()), Some("gzip"));
    assert_eq!(detect_from_extension("REPORT.CSV.BZ2").map(|c| c.name()), Some("bzip2"));
    assert!(detect_from_extension("report.csv").is_none());
}

#[test]
fn streams_round_trip_through_each_codec() -> anyhow::Result<()> {
    for name in ["plain.csv", "r.csv.gz", "r.csv.zst", "r.csv.bz2", "r.csv.xz"] {
        assert_eq!(round_trip(name)?, TEXT, "codec for {name}");
    }
    Ok(())
}

#[test]
fn magic_bytes_identify_misnamed_files() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let gz = dir.path().join("data.csv.gz");
    {
        let mut w = auto_detect_writer(File::create(&gz)?, &gz)?;
        w.write_all(TEXT.as_bytes())?;
    }
    let renamed = dir.path().join("data.bin");
    std::fs::rename(&gz, &renamed)?;

    let mut out = String::new();
    auto_detect_reader(File::open(&renamed)?, &renamed)?.read_to_string(&mut out)?;
    assert_eq!(out, TEXT);
    Ok(())
}

#[test]
fn compressed_csv_exports_are_discovered_and_parsed() -> anyhow::Result<()> {
    let dir = tempdir()?;
    for (i, ext) in ["gz", "zst", "bz2", "xz"].iter().enumerate() {
        CurFileBuilder::new()
            .columns(sample_header())
            .rows(sample_rows())
            .write_csv(dir.path().join(format!("part-{i}.csv.{ext}")))?;
    }

    let mut parser = CurParser::new(dir.path());
    assert_eq!(parser.discover()?.file_count(), 4);
    assert_eq!(parser.parse_to_table(None, None, None)?.len(), 16);
    Ok(())
}
