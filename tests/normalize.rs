use cur_ingest::normalize::is_tag_field;
use cur_ingest::{ColumnMap, normalize};

#[test]
fn known_columns_map_to_logical_names() {
    let cases = [
        ("lineItem/UsageStartDate", "usage_start_date"),
        ("lineItem/ProductCode", "product_code"),
        ("lineItem/UnblendedCost", "unblended_cost"),
        ("lineItem/UsageAccountId", "usage_account_id"),
        ("product/region", "region"),
        ("line_item_unblended_cost", "unblended_cost"),
        ("line_item_resource_id", "resource_id"),
        ("product_region", "region"),
        ("reservation/ReservationARN", "reservation_arn"),
        ("savings_plan_savings_plan_effective_cost", "savings_plan_effective_cost"),
    ];
    for (raw, want) in cases {
        assert_eq!(normalize(raw), want, "normalizing {raw}");
    }
}

#[test]
fn tag_columns_use_last_segment_lowercased() {
    assert_eq!(normalize("resourceTags/user:Environment"), "tag_user:environment");
    assert_eq!(normalize("resourceTags/aws:createdBy"), "tag_aws:createdby");
    assert_eq!(normalize("resource_tags_user_team"), "tag_user_team");
    assert!(is_tag_field(&normalize("resourceTags/user:Owner")));
    assert!(!is_tag_field("unblended_cost"));
}

#[test]
fn unknown_columns_are_snake_cased() {
    assert_eq!(normalize("lineItem/NetUnblendedRate"), "line_item__net_unblended_rate");
    assert_eq!(normalize("costCategory/team"), "cost_category_team");
    assert_eq!(normalize("already_snake"), "already_snake");
}

#[test]
fn normalization_is_total_and_deterministic() {
    for raw in ["", "/", "::", "X", "a/b:C", "ÜberCost", "lineItem/UnblendedCost"] {
        let first = normalize(raw);
        assert!(!first.is_empty(), "empty result for {raw:?}");
        assert_eq!(first, normalize(raw));
    }
    assert_eq!(normalize(""), "unnamed_column");
}

#[test]
fn column_map_resolves_both_directions() {
    let map = ColumnMap::from_columns(vec![
        "lineItem/ProductCode".to_string(),
        "lineItem/UnblendedCost".to_string(),
        "product/region".to_string(),
    ]);

    assert_eq!(map.len(), 3);
    assert_eq!(map.logical("lineItem/UnblendedCost"), Some("unblended_cost"));
    assert_eq!(map.raw("region"), Some("product/region"));
    assert!(map.contains_logical("product_code"));
    assert!(!map.contains_logical("resource_id"));
    assert_eq!(map.resolve("lineItem/ResourceId"), "resource_id");
    assert_eq!(
        map.logical_names().collect::<Vec<_>>(),
        vec!["product_code", "unblended_cost", "region"]
    );
}

#[test]
fn column_map_keeps_logical_names_unique() {
    let map = ColumnMap::from_columns(vec![
        "product_region".to_string(),
        "product_region_code".to_string(),
        "product/region".to_string(),
    ]);
    assert_eq!(
        map.logical_names().collect::<Vec<_>>(),
        vec!["region", "product_region_code", "region_2"]
    );
    assert_eq!(map.raw("region"), Some("product_region"));
    assert_eq!(map.raw("region_2"), Some("product/region"));
}
