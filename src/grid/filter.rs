use crate::data::PlanRecord;

/// Case-insensitive substring match on SKU. An empty needle matches all.
pub fn sku_matches(sku: &str, needle: &str) -> bool {
    needle.is_empty() || sku.to_lowercase().contains(&needle.to_lowercase())
}

/// Records whose SKU contains `needle`, ignoring case.
pub fn filter_by_sku(records: &[PlanRecord], needle: &str) -> Vec<PlanRecord> {
    records
        .iter()
        .filter(|r| sku_matches(&r.sku, needle))
        .cloned()
        .collect()
}
