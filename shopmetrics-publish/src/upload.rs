//! Sequential, fail-fast upload of partition files.

use shopmetrics_core::PartitionFile;
use tracing::info;

use crate::error::PublishError;
use crate::keys::object_key;
use crate::store::BlockingStore;

/// Upload every file under `prefix`, in order. The first failure is
/// returned as-is; objects already put stay in the store.
pub fn upload_partitions(
    store: &BlockingStore,
    prefix: &str,
    files: &[PartitionFile],
) -> Result<Vec<String>, PublishError> {
    let mut keys = Vec::with_capacity(files.len());
    let mut bytes = 0usize;

    for file in files {
        let key = object_key(prefix, file);
        bytes += store.put_file(&file.local_path, &key)?;
        keys.push(key);
    }

    info!(store = store.label(), objects = keys.len(), bytes, "uploaded partitions");
    Ok(keys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use shopmetrics_core::PartitionKey;
    use std::path::PathBuf;

    fn file_at(path: PathBuf, shop: &str) -> PartitionFile {
        PartitionFile {
            key: PartitionKey {
                date: NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(),
                shop_id: shop.into(),
            },
            file_name: path.file_name().unwrap().to_string_lossy().into_owned(),
            local_path: path,
            row_count: 1,
        }
    }

    #[test]
    fn uploads_in_order_under_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("part-a.parquet");
        let b = dir.path().join("part-b.parquet");
        std::fs::write(&a, b"A").unwrap();
        std::fs::write(&b, b"B").unwrap();

        let store = BlockingStore::in_memory().unwrap();
        let keys = upload_partitions(&store, "/pre/", &[file_at(a, "x.test"), file_at(b, "y.test")]).unwrap();

        assert_eq!(
            keys,
            vec![
                "pre/dt=2024-03-02/shop_id=x.test/part-a.parquet",
                "pre/dt=2024-03-02/shop_id=y.test/part-b.parquet",
            ]
        );
        assert_eq!(store.get(&keys[1]).unwrap(), b"B");
    }

    #[test]
    fn stops_at_first_failure() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("part-a.parquet");
        let c = dir.path().join("part-c.parquet");
        std::fs::write(&a, b"A").unwrap();
        std::fs::write(&c, b"C").unwrap();
        let missing = dir.path().join("part-b.parquet");

        let store = BlockingStore::in_memory().unwrap();
        let files = [file_at(a, "s.test"), file_at(missing, "s.test"), file_at(c, "s.test")];
        let err = upload_partitions(&store, "p", &files).unwrap_err();

        assert!(matches!(err, PublishError::LocalRead { .. }));
        assert!(store.get("p/dt=2024-03-02/shop_id=s.test/part-a.parquet").is_ok());
        assert!(store.get("p/dt=2024-03-02/shop_id=s.test/part-c.parquet").is_err());
    }

    #[test]
    fn store_rejection_is_upload_error_for_that_key() {
        let dir = tempfile::tempdir().unwrap();
        let mut files = Vec::new();
        for (name, shop) in [
            ("part-a.parquet", "x.test"),
            ("part-b.parquet", "y.test"),
            ("part-c.parquet", "z.test"),
        ] {
            let path = dir.path().join(name);
            std::fs::write(&path, name).unwrap();
            files.push(file_at(path, shop));
        }

        // A plain file where the second partition's directory must go.
        let mirror = dir.path().join("mirror");
        std::fs::create_dir_all(mirror.join("p/dt=2024-03-02")).unwrap();
        std::fs::write(mirror.join("p/dt=2024-03-02/shop_id=y.test"), b"").unwrap();

        let store = BlockingStore::local(&mirror).unwrap();
        let err = upload_partitions(&store, "p", &files).unwrap_err();

        match err {
            PublishError::Upload { key, .. } => {
                assert_eq!(key, "p/dt=2024-03-02/shop_id=y.test/part-b.parquet")
            }
            other => panic!("expected Upload, got {other:?}"),
        }
        assert!(mirror.join("p/dt=2024-03-02/shop_id=x.test/part-a.parquet").is_file());
        assert!(!mirror.join("p/dt=2024-03-02/shop_id=z.test").exists());
    }
}
