use cur_ingest::aggregate::{ChunkAggregator, CostByDay, CostByKey, TagCoverage, fold_chunks};
use cur_ingest::testing::{CurFileBuilder, assert_cost_eq, assert_costs_close, sample_header, sample_rows};
use cur_ingest::{Chunk, CurParser, Domain, Value};
use chrono::NaiveDate;
use tempfile::tempdir;

fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid test date")
}

#[test]
fn resource_costs_sum_per_resource() -> anyhow::Result<()> {
    let dir = tempdir()?;
    CurFileBuilder::new()
        .columns(["lineItem/ResourceId", "lineItem/ProductCode", "lineItem/UnblendedCost"])
        .row(["i-1", "AmazonEC2", "10.00"])
        .row(["i-1", "AmazonEC2", "5.50"])
        .row(["i-2", "AmazonEC2", "3.25"])
        .write_csv(dir.path().join("report.csv"))?;

    let mut parser = CurParser::new(dir.path());
    let costs = parser.resource_costs(None)?;
    assert_costs_close(&costs, &[("i-1", 15.50), ("i-2", 3.25)], 1e-9);
    Ok(())
}

#[test]
fn resource_costs_within_a_domain() -> anyhow::Result<()> {
    let dir = tempdir()?;
    CurFileBuilder::new()
        .columns(sample_header())
        .rows(sample_rows())
        .write_parquet(dir.path().join("part-0.parquet"))?;

    let mut parser = CurParser::new(dir.path());
    let storage = parser.resource_costs(Some(Domain::Storage))?;
    assert_costs_close(&storage, &[("bucket-logs", 1.20)], 1e-9);

    let services = parser.service_costs()?;
    assert_costs_close(&services, &[("AmazonEC2", 18.75), ("AmazonS3", 1.20)], 1e-9);
    Ok(())
}

#[test]
fn daily_costs_are_sorted_by_day() -> anyhow::Result<()> {
    let dir = tempdir()?;
    CurFileBuilder::new()
        .columns(sample_header())
        .rows(sample_rows().into_iter().rev())
        .write_csv(dir.path().join("report.csv.gz"))?;

    let mut parser = CurParser::new(dir.path());
    let daily = parser.daily_costs(None)?;
    let days: Vec<_> = daily.keys().copied().collect();
    assert_eq!(days, vec![day("2024-01-01"), day("2024-01-02"), day("2024-01-03")]);
    assert_cost_eq(daily[&day("2024-01-02")], 8.75, 1e-9);

    let compute = parser.daily_costs(Some(Domain::Compute))?;
    assert_eq!(compute.len(), 2);
    Ok(())
}

#[test]
fn missing_costs_count_as_zero_and_bad_values_are_excluded() {
    let chunk = Chunk::new(
        vec!["resource_id".into(), "usage_start_date".into(), "unblended_cost".into()],
        vec![
            vec!["i-1".into(), "2024-03-01".into(), Value::Null],
            vec!["i-1".into(), "2024-03-01".into(), "2.5".into()],
            vec!["i-2".into(), "not a date".into(), "oops".into()],
            vec![Value::Null, "2024-03-02T10:00:00Z".into(), 1.0.into()],
            vec!["i-1".into(), "2024-03-01".into(), "NaN".into()],
            vec!["i-1".into(), "2024-03-02".into(), "inf".into()],
            vec!["i-1".into(), "2024-03-02".into(), f64::NAN.into()],
        ],
    );

    let mut by_resource = CostByKey::resource();
    by_resource.add_chunk(&chunk);
    let totals = by_resource.finish();
    assert_costs_close(&totals, &[("i-1", 2.5)], 1e-9);

    let mut by_day = CostByDay::new();
    by_day.add_chunk(&chunk);
    let daily = by_day.finish();
    assert_eq!(daily.len(), 2);
    assert_cost_eq(daily[&day("2024-03-01")], 2.5, 1e-9);
    assert_cost_eq(daily[&day("2024-03-02")], 1.0, 1e-9);
}

#[test]
fn chunks_without_needed_columns_are_skipped() -> anyhow::Result<()> {
    let no_cost = Chunk::new(vec!["resource_id".into()], vec![vec!["i-1".into()]]);
    let with_cost = Chunk::new(
        vec!["resource_id".into(), "unblended_cost".into()],
        vec![vec!["i-1".into(), 4.0.into()]],
    );
    let chunks = vec![Ok(no_cost), Ok(with_cost)];
    let totals = fold_chunks(chunks, CostByKey::resource())?;
    assert_costs_close(&totals, &[("i-1", 4.0)], 1e-9);
    Ok(())
}

#[test]
fn tag_coverage_counts_tagged_rows() -> anyhow::Result<()> {
    let dir = tempdir()?;
    CurFileBuilder::new()
        .columns(sample_header())
        .rows(sample_rows())
        .write_csv(dir.path().join("report.csv"))?;

    let mut parser = CurParser::new(dir.path());
    let coverage = parser.tag_coverage()?;
    assert_eq!(coverage.len(), 1);
    let team = coverage["user:team"];
    assert_eq!((team.tagged, team.untagged), (3, 1));
    assert_cost_eq(team.coverage(), 0.75, 1e-12);

    let mut agg = TagCoverage::new();
    agg.add_chunk(&Chunk::new(vec!["unblended_cost".into()], vec![vec![1.0.into()]]));
    assert!(agg.finish().is_empty());
    Ok(())
}

#[test]
fn non_finite_costs_do_not_poison_totals() -> anyhow::Result<()> {
    let dir = tempdir()?;
    CurFileBuilder::new()
        .columns(["lineItem/ResourceId", "lineItem/UnblendedCost"])
        .row(["i-1", "1.0"])
        .row(["i-1", "NaN"])
        .row(["i-1", "-inf"])
        .write_csv(dir.path().join("report.csv"))?;

    let mut parser = CurParser::new(dir.path());
    let costs = parser.resource_costs(None)?;
    assert_costs_close(&costs, &[("i-1", 1.0)], 1e-9);
    Ok(())
}
