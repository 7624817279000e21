//! Row selection: filtering and ordering of report rows.

use regex::Regex;

use whodu_core::{NamedUsage, ReportOptions, SortMetric};

use crate::error::ReportError;

/// Compile the user-name filter out of the options.
///
/// An absent or empty pattern means "keep everything". A malformed pattern
/// is a configuration error; callers reject it before any walk starts.
pub fn compile_filter(options: &ReportOptions) -> Result<Option<Regex>, ReportError> {
    match options.user_filter.as_deref() {
        None | Some("") => Ok(None),
        Some(pattern) => Regex::new(pattern)
            .map(Some)
            .map_err(|source| ReportError::InvalidFilter {
                pattern: pattern.to_string(),
                source,
            }),
    }
}

/// Keep the rows whose name matches the filter (search semantics, not a
/// full match). `None` keeps all rows.
pub fn filter_users(rows: &[NamedUsage], filter: Option<&Regex>) -> Vec<NamedUsage> {
    match filter {
        None => rows.to_vec(),
        Some(re) => rows
            .iter()
            .filter(|row| re.is_match(&row.name))
            .cloned()
            .collect(),
    }
}

/// Order rows ascending by the chosen metric. The sort is stable, so ties
/// keep their input order.
pub fn sort_by_metric(rows: &mut [NamedUsage], metric: SortMetric) {
    rows.sort_by_key(|row| metric.key(&row.usage));
}

#[cfg(test)]
mod tests {
    use super::*;
    use whodu_core::OwnerUsage;

    fn named(name: &str, blocks: u64) -> NamedUsage {
        let mut usage = OwnerUsage::new();
        usage.record_file(blocks * 512, blocks);
        NamedUsage {
            name: name.into(),
            usage,
        }
    }

    #[test]
    fn test_filter_uses_search_semantics() {
        let rows = [named("alice", 1), named("bob", 1), named("alicia", 1)];
        let re = Regex::new("ali").unwrap();

        let kept = filter_users(&rows, Some(&re));
        let names: Vec<_> = kept.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["alice", "alicia"]);
    }

    #[test]
    fn test_absent_filter_keeps_all() {
        let rows = [named("alice", 1), named("bob", 1), named("alicia", 1)];
        assert_eq!(filter_users(&rows, None).len(), 3);
    }

    #[test]
    fn test_empty_pattern_means_no_filter() {
        let options = ReportOptions::builder()
            .user_filter(Some(String::new()))
            .build()
            .unwrap();
        assert!(compile_filter(&options).unwrap().is_none());
    }

    #[test]
    fn test_malformed_pattern_is_a_config_error() {
        let options = ReportOptions::builder()
            .user_filter(Some("[unclosed".to_string()))
            .build()
            .unwrap();
        assert!(matches!(
            compile_filter(&options),
            Err(ReportError::InvalidFilter { .. })
        ));
    }

    #[test]
    fn test_sort_is_stable_on_ties() {
        let mut rows = vec![named("g1", 5), named("g2", 5), named("g3", 2)];
        sort_by_metric(&mut rows, SortMetric::Blocks);

        let names: Vec<_> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["g3", "g1", "g2"]);
    }

    #[test]
    fn test_sort_by_file_size() {
        let mut rows = vec![named("big", 100), named("small", 1), named("mid", 10)];
        sort_by_metric(&mut rows, SortMetric::FileSize);

        let names: Vec<_> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["small", "mid", "big"]);
    }
}
