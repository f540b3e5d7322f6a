//! A small, realistic CUR 1 export.
//!
//! Two EC2 instances and one S3 bucket across two accounts and three days.
//! Totals: `i-1` 15.50, `i-2` 3.25, `bucket-logs` 1.20; `AmazonEC2` 18.75.

/// Raw CUR 1 header, slash-style, including one resource tag.
#[must_use]
pub fn sample_header() -> Vec<String> {
    [
        "identity/LineItemId",
        "lineItem/UsageAccountId",
        "lineItem/UsageStartDate",
        "lineItem/ProductCode",
        "lineItem/ResourceId",
        "lineItem/UsageAmount",
        "lineItem/UnblendedCost",
        "product/region",
        "resourceTags/user:Team",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Rows matching [`sample_header`].
#[must_use]
pub fn sample_rows() -> Vec<Vec<String>> {
    [
        ["li-1", "111111111111", "2024-01-01T00:00:00Z", "AmazonEC2", "i-1", "24", "10.00", "us-east-1", "platform"],
        ["li-2", "111111111111", "2024-01-02T00:00:00Z", "AmazonEC2", "i-1", "12", "5.50", "us-east-1", "platform"],
        ["li-3", "222222222222", "2024-01-02T00:00:00Z", "AmazonEC2", "i-2", "6", "3.25", "eu-west-1", ""],
        ["li-4", "222222222222", "2024-01-03T00:00:00Z", "AmazonS3", "bucket-logs", "100", "1.20", "eu-west-1", "data"],
    ]
    .into_iter()
    .map(|row| row.into_iter().map(String::from).collect())
    .collect()
}
