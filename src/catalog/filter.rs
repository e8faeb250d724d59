use crate::storage::models::SoftwareRecord;

/// Narrow an ordered listing by category and free-text query, then cap it.
/// Input order is preserved; the limit applies after both filters.
pub fn filter_software(
    records: Vec<SoftwareRecord>,
    category: Option<&str>,
    query: Option<&str>,
    limit: Option<usize>,
) -> Vec<SoftwareRecord> {
    let mut result: Vec<SoftwareRecord> = records
        .into_iter()
        .filter(|s| matches_category(s, category) && matches_query(s, query))
        .collect();

    if let Some(limit) = limit {
        result.truncate(limit);
    }
    result
}

/// Case-insensitive category filter, used as a fallback when an exact match
/// comes up empty.
pub fn filter_by_category_ci(records: Vec<SoftwareRecord>, category: &str) -> Vec<SoftwareRecord> {
    let wanted = category.to_lowercase();
    records
        .into_iter()
        .filter(|s| s.category.to_lowercase() == wanted)
        .collect()
}

/// Category comparison is exact: "Utilities" and "utilities" are distinct.
/// An empty category string applies no filter.
fn matches_category(software: &SoftwareRecord, category: Option<&str>) -> bool {
    match category {
        Some(c) if !c.is_empty() => software.category == c,
        _ => true,
    }
}

/// Case-insensitive substring match over title, description, and every tag.
/// An empty query matches everything.
fn matches_query(software: &SoftwareRecord, query: Option<&str>) -> bool {
    let query = match query {
        Some(q) if !q.is_empty() => q.to_lowercase(),
        _ => return true,
    };

    software.title.to_lowercase().contains(&query)
        || software.description.to_lowercase().contains(&query)
        || software
            .tags
            .iter()
            .any(|tag| tag.to_lowercase().contains(&query))
}
