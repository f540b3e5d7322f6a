//! Column-name normalization across CUR format revisions.
//!
//! Raw billing columns are spelled differently depending on the export
//! flavour: the classic text export uses `category/Name` paths
//! (`lineItem/UnblendedCost`), the columnar export flattens the same
//! concepts to snake case (`line_item_unblended_cost`). [`normalize`] folds
//! every spelling onto one logical name, and [`ColumnMap`] keeps the
//! resulting raw/logical pairs for one dataset.

use std::collections::{HashMap, HashSet};

/// Known raw column spellings and the logical field each one maps to.
const COLUMN_MAPPINGS: &[(&str, &str)] = &[
    // Line item
    ("lineItem/UsageStartDate", "usage_start_date"),
    ("lineItem/UsageEndDate", "usage_end_date"),
    ("lineItem/ProductCode", "product_code"),
    ("lineItem/UsageType", "usage_type"),
    ("lineItem/Operation", "operation"),
    ("lineItem/ResourceId", "resource_id"),
    ("lineItem/UsageAmount", "usage_amount"),
    ("lineItem/UnblendedCost", "unblended_cost"),
    ("lineItem/BlendedCost", "blended_cost"),
    ("lineItem/LineItemType", "line_item_type"),
    ("line_item_usage_start_date", "usage_start_date"),
    ("line_item_usage_end_date", "usage_end_date"),
    ("line_item_product_code", "product_code"),
    ("line_item_usage_type", "usage_type"),
    ("line_item_operation", "operation"),
    ("line_item_resource_id", "resource_id"),
    ("line_item_usage_amount", "usage_amount"),
    ("line_item_unblended_cost", "unblended_cost"),
    ("line_item_blended_cost", "blended_cost"),
    ("line_item_line_item_type", "line_item_type"),
    // Account and billing period
    ("lineItem/UsageAccountId", "usage_account_id"),
    ("bill/PayerAccountId", "payer_account_id"),
    ("bill/BillingPeriodStartDate", "billing_period_start"),
    ("bill/BillingPeriodEndDate", "billing_period_end"),
    ("line_item_usage_account_id", "usage_account_id"),
    ("bill_payer_account_id", "payer_account_id"),
    ("bill_billing_period_start_date", "billing_period_start"),
    ("bill_billing_period_end_date", "billing_period_end"),
    // Product
    ("product/region", "region"),
    ("product/instanceType", "instance_type"),
    ("product/instanceFamily", "instance_family"),
    ("product/operatingSystem", "operating_system"),
    ("product/tenancy", "tenancy"),
    ("product/volumeType", "volume_type"),
    ("product/storageClass", "storage_class"),
    ("product/databaseEngine", "database_engine"),
    ("product_region", "region"),
    ("product_instance_type", "instance_type"),
    ("product_instance_family", "instance_family"),
    ("product_operating_system", "operating_system"),
    ("product_tenancy", "tenancy"),
    ("product_volume_type", "volume_type"),
    ("product_storage_class", "storage_class"),
    ("product_database_engine", "database_engine"),
    // Pricing
    ("pricing/publicOnDemandCost", "public_ondemand_cost"),
    ("pricing/term", "pricing_term"),
    ("pricing/unit", "pricing_unit"),
    ("pricing_public_on_demand_cost", "public_ondemand_cost"),
    ("pricing_term", "pricing_term"),
    ("pricing_unit", "pricing_unit"),
    // Reservations
    ("reservation/ReservationARN", "reservation_arn"),
    ("reservation/EffectiveCost", "reservation_effective_cost"),
    ("reservation/UnusedQuantity", "reservation_unused_quantity"),
    ("reservation/UnusedRecurringFee", "reservation_unused_fee"),
    ("reservation_reservation_a_r_n", "reservation_arn"),
    ("reservation_reservation_arn", "reservation_arn"),
    ("reservation_effective_cost", "reservation_effective_cost"),
    ("reservation_unused_quantity", "reservation_unused_quantity"),
    ("reservation_unused_recurring_fee", "reservation_unused_fee"),
    // Savings Plans
    ("savingsPlan/SavingsPlanARN", "savings_plan_arn"),
    ("savingsPlan/SavingsPlanEffectiveCost", "savings_plan_effective_cost"),
    ("savingsPlan/SavingsPlanRate", "savings_plan_rate"),
    ("savings_plan_savings_plan_a_r_n", "savings_plan_arn"),
    ("savings_plan_savings_plan_arn", "savings_plan_arn"),
    ("savings_plan_savings_plan_effective_cost", "savings_plan_effective_cost"),
    ("savings_plan_savings_plan_rate", "savings_plan_rate"),
];

/// Raw prefixes that mark a resource-tag column.
const TAG_PREFIXES: &[&str] = &["resourceTags/", "resource_tags_"];

/// Prefix of every logical tag field.
pub const TAG_FIELD_PREFIX: &str = "tag_";

/// Logical name used when a raw name normalizes to nothing.
const UNNAMED_COLUMN: &str = "unnamed_column";

/// Map a raw billing column name to its logical field name.
///
/// Total and deterministic: unknown columns go through a structural
/// snake-case transform, so every input yields a non-empty name.
pub fn normalize(raw: &str) -> String {
    if let Some((_, logical)) = COLUMN_MAPPINGS.iter().find(|(r, _)| *r == raw) {
        return (*logical).to_string();
    }

    for prefix in TAG_PREFIXES {
        if let Some(rest) = raw.strip_prefix(prefix) {
            let tag = rest.rsplit('/').next().unwrap_or(rest);
            return format!("{TAG_FIELD_PREFIX}{}", tag.to_lowercase());
        }
    }

    let flattened = raw.replace(['/', ':'], "_");
    let mut out = String::with_capacity(flattened.len() + 4);
    for (i, ch) in flattened.chars().enumerate() {
        if ch.is_uppercase() && i > 0 {
            out.push('_');
        }
        out.extend(ch.to_lowercase());
    }

    if out.trim_matches('_').is_empty() {
        UNNAMED_COLUMN.to_string()
    } else {
        out
    }
}

/// Make a sequence of logical names unique, keeping order. Repeats get
/// `_2`, `_3`, ... appended, skipping any suffix already taken.
pub fn unique_names<I>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let names: Vec<String> = names.into_iter().collect();
    let mut taken: HashSet<String> = HashSet::with_capacity(names.len());
    let mut out = Vec::with_capacity(names.len());
    for name in names {
        let mut candidate = name.clone();
        let mut n = 2;
        while taken.contains(&candidate) {
            candidate = format!("{name}_{n}");
            n += 1;
        }
        taken.insert(candidate.clone());
        out.push(candidate);
    }
    out
}

/// Whether a logical field name denotes a resource tag.
pub fn is_tag_field(logical: &str) -> bool {
    logical.starts_with(TAG_FIELD_PREFIX)
}

/// Raw/logical column pairs for one dataset, plus the derived reverse index.
///
/// Built once from the first discovered file and shared (behind an `Arc`)
/// by every reader of the same discovery.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnMap {
    pairs: Vec<(String, String)>,
    reverse: HashMap<String, String>,
}

impl ColumnMap {
    /// Normalize every raw column of a schema, preserving schema order.
    ///
    /// Logical names are unique within the map: when two raw columns fold
    /// onto the same name, the first keeps it and later ones get a numeric
    /// suffix (`region`, `region_2`).
    pub fn from_columns<I, S>(raw_columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let raw: Vec<String> = raw_columns
            .into_iter()
            .map(|c| c.as_ref().to_string())
            .collect();
        let logical = unique_names(raw.iter().map(|r| normalize(r)));
        let pairs: Vec<(String, String)> = raw.into_iter().zip(logical).collect();

        let reverse = pairs
            .iter()
            .map(|(raw, logical)| (logical.clone(), raw.clone()))
            .collect();

        Self { pairs, reverse }
    }

    /// Logical name of a raw column known to this map.
    pub fn logical(&self, raw: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(r, _)| r == raw)
            .map(|(_, l)| l.as_str())
    }

    /// Raw spelling of a logical field in the schema this map was built from.
    pub fn raw(&self, logical: &str) -> Option<&str> {
        self.reverse.get(logical).map(String::as_str)
    }

    /// Logical name of any raw column, falling back to [`normalize`] for
    /// columns the first file did not have.
    pub fn resolve(&self, raw: &str) -> String {
        self.logical(raw)
            .map_or_else(|| normalize(raw), str::to_string)
    }

    /// Whether the dataset schema carries the given logical field.
    pub fn contains_logical(&self, logical: &str) -> bool {
        self.reverse.contains_key(logical)
    }

    /// Logical names in schema order.
    pub fn logical_names(&self) -> impl Iterator<Item = &str> {
        self.pairs.iter().map(|(_, l)| l.as_str())
    }

    /// `(raw, logical)` pairs in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(r, l)| (r.as_str(), l.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}
