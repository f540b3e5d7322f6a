use cur_ingest::io::csv::CsvReader;
use cur_ingest::io::{FormatReader, ReadPlan, SourceFormat};
use cur_ingest::testing::{CurFileBuilder, sample_header, sample_rows};
use cur_ingest::{Chunk, ColumnMap, CurError, Filters, Value};
use std::fs;
use std::sync::Arc;
use tempfile::tempdir;

fn plan_for(header: Vec<String>, chunk_size: usize) -> ReadPlan {
    ReadPlan::new(Arc::new(ColumnMap::from_columns(header)), chunk_size)
}

fn collect(reader: &CsvReader, path: &std::path::Path, plan: ReadPlan) -> anyhow::Result<Vec<Chunk>> {
    Ok(reader
        .read_chunks(path, Arc::new(plan))?
        .collect::<Result<Vec<_>, _>>()?)
}

#[test]
fn reads_raw_header() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("report.csv");
    CurFileBuilder::new()
        .columns(sample_header())
        .rows(sample_rows())
        .write_csv(&path)?;

    let reader = CsvReader;
    assert_eq!(reader.format(), SourceFormat::Csv);
    assert_eq!(reader.read_columns(&path)?, sample_header());
    Ok(())
}

#[test]
fn chunks_are_normalized_and_bounded() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("report.csv");
    CurFileBuilder::new()
        .columns(["lineItem/ResourceId", "lineItem/UnblendedCost"])
        .generate(25, |i| [format!("i-{i}"), format!("{i}.5")])
        .write_csv(&path)?;

    let chunks = collect(&CsvReader, &path, plan_for(CsvReader.read_columns(&path)?, 10))?;
    let sizes: Vec<usize> = chunks.iter().map(Chunk::len).collect();
    assert_eq!(sizes, vec![10, 10, 5]);
    for chunk in &chunks {
        assert_eq!(chunk.columns(), ["resource_id", "unblended_cost"]);
    }
    assert_eq!(chunks[2].value(4, "resource_id"), Some(&Value::from("i-24")));
    Ok(())
}

#[test]
fn gzip_input_is_decompressed() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("report.csv.gz");
    CurFileBuilder::new()
        .columns(sample_header())
        .rows(sample_rows())
        .write_csv(&path)?;

    // really compressed on disk
    assert_eq!(&fs::read(&path)?[..2], &[0x1f, 0x8b]);

    let chunks = collect(&CsvReader, &path, plan_for(sample_header(), 100))?;
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].len(), 4);
    assert!(chunks[0].has_column("tag_user:team"));
    Ok(())
}

#[test]
fn empty_fields_become_null_and_short_rows_are_padded() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("ragged.csv");
    fs::write(
        &path,
        "lineItem/ResourceId,lineItem/UnblendedCost,product/region\ni-1,,us-east-1\ni-2,2.0\n",
    )?;

    let chunks = collect(&CsvReader, &path, plan_for(CsvReader.read_columns(&path)?, 100))?;
    let chunk = &chunks[0];
    assert_eq!(chunk.value(0, "unblended_cost"), Some(&Value::Null));
    assert_eq!(chunk.value(1, "region"), Some(&Value::Null));
    assert_eq!(chunk.value(1, "unblended_cost"), Some(&Value::from("2.0")));
    Ok(())
}

#[test]
fn projection_hides_filter_helper_columns() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("report.csv");
    CurFileBuilder::new()
        .columns(sample_header())
        .rows(sample_rows())
        .write_csv(&path)?;

    let mut plan = plan_for(sample_header(), 100);
    plan.columns = Some(vec!["resource_id".into(), "unblended_cost".into()]);
    plan.service_codes = Some(["AmazonEC2".to_string()].into_iter().collect());
    plan.filters = Filters::new().eq("region", "us-east-1");

    let chunks = collect(&CsvReader, &path, plan)?;
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].columns(), ["resource_id", "unblended_cost"]);
    assert_eq!(chunks[0].len(), 2);
    Ok(())
}

#[test]
fn fully_filtered_batches_are_skipped() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("report.csv");
    CurFileBuilder::new()
        .columns(["lineItem/ProductCode", "lineItem/UnblendedCost"])
        .generate(30, |i| {
            let code = if i < 20 { "AmazonS3" } else { "AmazonEC2" };
            [code.to_string(), "1".to_string()]
        })
        .write_csv(&path)?;

    let mut plan = plan_for(CsvReader.read_columns(&path)?, 10);
    plan.service_codes = Some(["AmazonEC2".to_string()].into_iter().collect());

    let chunks = collect(&CsvReader, &path, plan)?;
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].len(), 10);
    Ok(())
}

#[test]
fn unreadable_file_is_a_schema_error() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("empty.csv");
    fs::write(&path, "")?;

    let err = CsvReader.read_columns(&path).unwrap_err();
    assert!(matches!(err, CurError::SchemaRead { .. }), "{err}");
    Ok(())
}

#[test]
fn invalid_utf8_cells_do_not_abort_the_scan() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("latin1.csv");
    let mut bytes = b"lineItem/ResourceId,lineItem/UnblendedCost,resourceTags/user:Name\n".to_vec();
    bytes.extend_from_slice(b"i-1,1.0,ok\n");
    bytes.extend_from_slice(b"i-2,2.0,caf\xe9\n");
    bytes.extend_from_slice(b"i-3,3.0,ok\n");
    fs::write(&path, bytes)?;

    let chunks = collect(&CsvReader, &path, plan_for(CsvReader.read_columns(&path)?, 100))?;
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].len(), 3);
    assert_eq!(chunks[0].value(1, "tag_user:name"), Some(&Value::from("caf\u{FFFD}")));

    let mut parser = cur_ingest::CurParser::new(dir.path());
    let costs = parser.resource_costs(None)?;
    assert_eq!(costs.len(), 3);
    assert_eq!(costs["i-3"], 3.0);
    Ok(())
}
