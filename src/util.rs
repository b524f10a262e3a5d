use std::collections::BTreeMap;

/// Median of `values`, averaging the two middle elements for even counts.
///
/// Sorts `values` in place. `None` when empty.
pub fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

/// Smallest `value` of each bucket, ordered by bucket key.
pub fn bucket_minima<I>(items: I) -> BTreeMap<i64, f64>
where
    I: IntoIterator<Item = (i64, f64)>,
{
    let mut minima = BTreeMap::new();
    for (key, value) in items {
        minima
            .entry(key)
            .and_modify(|m: &mut f64| *m = m.min(value))
            .or_insert(value);
    }
    minima
}

/// Sorts ascending and optionally collapses equal values.
pub fn sorted_values(mut values: Vec<f64>, dedup: bool) -> Vec<f64> {
    values.sort_by(|a, b| a.total_cmp(b));
    if dedup {
        values.dedup();
    }
    values
}
