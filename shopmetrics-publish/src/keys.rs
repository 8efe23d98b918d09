//! Remote object key composition.

use shopmetrics_core::PartitionFile;

/// Strip surrounding whitespace and `/` from a key prefix.
pub fn normalize_prefix(prefix: &str) -> &str {
    prefix.trim().trim_matches('/')
}

/// `<prefix>/dt=<date>/shop_id=<shop>/<file>`, or without the prefix
/// segment when the normalized prefix is empty.
pub fn object_key(prefix: &str, file: &PartitionFile) -> String {
    let prefix = normalize_prefix(prefix);
    let rel = format!("{}/{}", file.key.relative_dir(), file.file_name);
    if prefix.is_empty() {
        rel
    } else {
        format!("{prefix}/{rel}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use shopmetrics_core::PartitionKey;
    use std::path::PathBuf;

    fn file() -> PartitionFile {
        PartitionFile {
            key: PartitionKey {
                date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
                shop_id: "a.test".into(),
            },
            file_name: "part-abc.parquet".into(),
            local_path: PathBuf::from("/tmp/x"),
            row_count: 1,
        }
    }

    #[test]
    fn prefix_is_trimmed() {
        assert_eq!(normalize_prefix("/daily_metrics/"), "daily_metrics");
        assert_eq!(normalize_prefix("  a/b//  "), "a/b");
        assert_eq!(normalize_prefix("///"), "");
    }

    #[test]
    fn key_layout() {
        assert_eq!(
            object_key("/daily_metrics/", &file()),
            "daily_metrics/dt=2024-01-15/shop_id=a.test/part-abc.parquet"
        );
    }

    #[test]
    fn empty_prefix_has_no_leading_slash() {
        assert_eq!(
            object_key("", &file()),
            "dt=2024-01-15/shop_id=a.test/part-abc.parquet"
        );
    }

    proptest::proptest! {
        #[test]
        fn keys_never_have_edge_or_double_slashes(
            prefix in " {0,2}/{0,3}[a-z]{0,6}(/[a-z]{1,4}){0,2}/{0,3} {0,2}",
        ) {
            let key = object_key(&prefix, &file());
            proptest::prop_assert!(!key.starts_with('/'));
            proptest::prop_assert!(!key.contains("//"));
            proptest::prop_assert!(key.ends_with("/shop_id=a.test/part-abc.parquet"));
        }
    }
}
