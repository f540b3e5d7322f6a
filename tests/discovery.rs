use cur_ingest::testing::{CurFileBuilder, sample_header, sample_rows};
use cur_ingest::{CurError, SourceFormat, discover};
use std::fs;
use tempfile::tempdir;

fn sample() -> CurFileBuilder {
    CurFileBuilder::new().columns(sample_header()).rows(sample_rows())
}

#[test]
fn empty_root_reports_no_data() -> anyhow::Result<()> {
    let dir = tempdir()?;
    fs::write(dir.path().join("README.txt"), "not billing data")?;

    match discover(dir.path()) {
        Err(CurError::NoDataFound { root }) => assert_eq!(root, dir.path()),
        other => panic!("expected NoDataFound, got {other:?}"),
    }
    Ok(())
}

#[test]
fn missing_root_reports_no_data() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let err = discover(dir.path().join("does-not-exist")).unwrap_err();
    assert!(matches!(err, CurError::NoDataFound { .. }));
    assert!(err.to_string().starts_with("No CUR files found in"));
    Ok(())
}

#[test]
fn csv_files_found_recursively_and_sorted() -> anyhow::Result<()> {
    let dir = tempdir()?;
    sample().write_csv(dir.path().join("2024-02/report-1.csv"))?;
    sample().write_csv(dir.path().join("2024-01/report-2.csv.gz"))?;
    sample().write_csv(dir.path().join("2024-01/report-1.csv"))?;

    let found = discover(dir.path())?;
    assert_eq!(found.format, SourceFormat::Csv);
    assert_eq!(found.file_count(), 3);
    let names: Vec<_> = found
        .files
        .iter()
        .map(|p| p.strip_prefix(dir.path()).map(|p| p.to_string_lossy().into_owned()))
        .collect::<Result<_, _>>()?;
    assert_eq!(
        names,
        vec!["2024-01/report-1.csv", "2024-01/report-2.csv.gz", "2024-02/report-1.csv"]
    );
    assert!(found.total_size_bytes > 0);
    assert_eq!(
        found.first_file(),
        Some(dir.path().join("2024-01/report-1.csv").as_path())
    );
    Ok(())
}

#[test]
fn parquet_takes_precedence_over_csv() -> anyhow::Result<()> {
    let dir = tempdir()?;
    sample().write_csv(dir.path().join("legacy/report.csv"))?;
    sample().write_parquet(dir.path().join("year=2024/month=1/part-0.parquet"))?;

    let found = discover(dir.path())?;
    assert_eq!(found.format, SourceFormat::Parquet);
    assert_eq!(found.file_count(), 1);
    assert!(found.files[0].ends_with("part-0.parquet"));
    Ok(())
}

#[test]
fn other_files_are_ignored() -> anyhow::Result<()> {
    let dir = tempdir()?;
    sample().write_csv(dir.path().join("report.csv"))?;
    fs::write(dir.path().join("manifest.json"), "{}")?;
    fs::write(dir.path().join("report.csv.bak"), "x")?;
    fs::create_dir_all(dir.path().join("nested.csv"))?;

    let found = discover(dir.path())?;
    assert_eq!(found.file_count(), 1);
    Ok(())
}
