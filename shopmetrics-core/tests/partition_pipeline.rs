//! Integration tests: registry → series → partitioned Parquet on disk.

use chrono::NaiveDate;
use shopmetrics_core::config::GenerationConfig;
use shopmetrics_core::writer::{read_partition_file, write_csv_dump};
use shopmetrics_core::{
    generate_series, read_registry_file, PartitionWriter, SeedPolicy, SequentialTokens,
    Synthesizer, UuidTokens,
};
use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::Path;

const REGISTRY: &str = "alpha.test,1000\n\nbeta.test, 2500.50\ngamma.test,75\n";

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
}

fn write_registry(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("shops.txt");
    fs::write(&path, REGISTRY).unwrap();
    path
}

fn parquet_files_under(root: &Path) -> Vec<std::path::PathBuf> {
    let mut out = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in fs::read_dir(&dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                stack.push(path);
            } else if path.extension().and_then(|e| e.to_str()) == Some("parquet") {
                out.push(path);
            }
        }
    }
    out
}

#[test]
fn every_record_lands_in_exactly_one_partition() {
    let dir = tempfile::tempdir().unwrap();
    let shops = read_registry_file(&write_registry(dir.path())).unwrap();
    assert_eq!(shops.len(), 3);

    let synth = Synthesizer::new(&GenerationConfig::default()).unwrap();
    let records = generate_series(&shops, today(), 5, &synth, &SeedPolicy::Fixed(11));
    assert_eq!(records.len(), 15);

    let root = dir.path().join("parquet");
    let files = PartitionWriter::new(&root)
        .write_all(&records, &mut SequentialTokens::new("r"))
        .unwrap();

    assert_eq!(files.len(), 15);
    assert!(files.iter().all(|f| f.row_count == 1));
    assert_eq!(files.iter().map(|f| f.row_count).sum::<usize>(), records.len());

    let mut read_back = Vec::new();
    for file in &files {
        let rows = read_partition_file(&file.local_path).unwrap();
        assert!(!rows.is_empty());
        for row in &rows {
            assert_eq!(row.shop_id, file.key.shop_id);
            assert_eq!(row.date, file.key.date);
        }
        read_back.extend(rows);
    }
    assert_eq!(read_back, records);
}

#[test]
fn duplicate_registry_entries_share_a_partition() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dupes.txt");
    fs::write(&path, "same.test,100\nsame.test,200\n").unwrap();
    let shops = read_registry_file(&path).unwrap();

    let synth = Synthesizer::new(&GenerationConfig::default()).unwrap();
    let records = generate_series(&shops, today(), 2, &synth, &SeedPolicy::Entropy);
    let files = PartitionWriter::new(dir.path().join("out"))
        .write_all(&records, &mut UuidTokens)
        .unwrap();

    assert_eq!(files.len(), 2);
    assert!(files.iter().all(|f| f.row_count == 2));
}

#[test]
fn reruns_never_overwrite_previous_files() {
    let dir = tempfile::tempdir().unwrap();
    let shops = read_registry_file(&write_registry(dir.path())).unwrap();
    let synth = Synthesizer::new(&GenerationConfig::default()).unwrap();
    let root = dir.path().join("parquet");
    let writer = PartitionWriter::new(&root);

    // Same seed twice: identical data, but file names must still differ.
    let records = generate_series(&shops, today(), 3, &synth, &SeedPolicy::Fixed(5));
    let first = writer.write_all(&records, &mut UuidTokens).unwrap();
    let second = writer.write_all(&records, &mut UuidTokens).unwrap();

    let names: HashSet<_> = first.iter().chain(&second).map(|f| f.local_path.clone()).collect();
    assert_eq!(names.len(), first.len() + second.len());
    assert_eq!(parquet_files_under(&root).len(), 18);
}

#[test]
fn partition_directories_follow_hive_layout() {
    let dir = tempfile::tempdir().unwrap();
    let shops = read_registry_file(&write_registry(dir.path())).unwrap();
    let synth = Synthesizer::new(&GenerationConfig::default()).unwrap();
    let records = generate_series(&shops, today(), 2, &synth, &SeedPolicy::Fixed(1));
    let root = dir.path().join("parquet");
    PartitionWriter::new(&root)
        .write_all(&records, &mut UuidTokens)
        .unwrap();

    let dt_dirs: BTreeSet<String> = fs::read_dir(&root)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        dt_dirs,
        BTreeSet::from(["dt=2024-01-14".to_string(), "dt=2024-01-15".to_string()])
    );
    assert!(root.join("dt=2024-01-15/shop_id=beta.test").is_dir());
}

#[test]
fn csv_dump_has_one_line_per_record() {
    let dir = tempfile::tempdir().unwrap();
    let shops = read_registry_file(&write_registry(dir.path())).unwrap();
    let synth = Synthesizer::new(&GenerationConfig::default()).unwrap();
    let records = generate_series(&shops, today(), 4, &synth, &SeedPolicy::Fixed(2));

    let csv_path = dir.path().join("daily_metrics.csv");
    write_csv_dump(&records, &csv_path).unwrap();

    let text = fs::read_to_string(&csv_path).unwrap();
    assert_eq!(text.lines().count(), records.len() + 1);
}
