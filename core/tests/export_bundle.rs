//! Publish-bundle round-trip tests: what the exporter writes must parse
//! back to exactly what the aggregator held in memory, and probability
//! mass must survive fixed-point scaling within the floor-error bound.

use fairway_core::{
    export::{self, BookObject, ExportOptions, IndexDescriptor},
    Aggregator, RoundEngine, SimError, SymbolTable, SCALE,
};
use std::collections::{HashMap, HashSet};
use std::io::BufRead;
use std::path::PathBuf;

struct TempDir(PathBuf);

impl TempDir {
    fn new(label: &str) -> Self {
        let dir = std::env::temp_dir().join(format!(
            "fairway-{label}-{}",
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).expect("create temp dir");
        Self(dir)
    }

    fn prefix(&self, name: &str) -> PathBuf {
        self.0.join(name)
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.0);
    }
}

fn run_batch(rounds: u64, base_seed: u64) -> fairway_core::Aggregation {
    let aggregator = Aggregator::new(RoundEngine::new(SymbolTable::default_course()));
    aggregator
        .simulate(rounds, 1.0, Some(base_seed))
        .expect("batch aggregation")
}

#[test]
fn logic_artifact_round_trips_through_zstd_and_json() {
    let dir = TempDir::new("logic-roundtrip");
    let agg = run_batch(1000, 42);
    let bundle =
        export::export_bundle(&agg, &dir.prefix("golf_normal"), &ExportOptions::default())
            .expect("export");

    assert!(bundle.logic.to_string_lossy().ends_with("_logic.jsonl.zst"));

    let file = std::fs::File::open(&bundle.logic).expect("open logic file");
    let decoder = zstd::stream::Decoder::new(file).expect("zstd decoder");
    let reader = std::io::BufReader::new(decoder);

    let books: Vec<BookObject> = reader
        .lines()
        .map(|line| serde_json::from_str(&line.expect("read line")).expect("parse book"))
        .collect();

    assert_eq!(books.len(), agg.records.len());
    for (book, record) in books.iter().zip(agg.records.iter()) {
        assert_eq!(book.id, record.id);
        assert_eq!(book.payout_multiplier, record.payout_cents);
        assert_eq!(book.path, record.path);
        assert_eq!(book.events, record.sample.book);
        let expected_win = record.sample.bet_amount * (record.payout_cents as f64 / 100.0);
        assert!((book.win - expected_win).abs() < 1e-9);
    }
}

#[test]
fn lookup_csv_has_one_row_per_simulated_round() {
    let dir = TempDir::new("lookup-rows");
    let agg = run_batch(1000, 42);
    let bundle =
        export::export_bundle(&agg, &dir.prefix("golf_normal"), &ExportOptions::default())
            .expect("export");

    let content = std::fs::read_to_string(&bundle.lookup).expect("read lookup");
    let rows: Vec<(u64, u64, i64)> = content
        .lines()
        .map(|line| {
            let mut cols = line.split(',');
            (
                cols.next().unwrap().parse().expect("simulationId"),
                cols.next().unwrap().parse().expect("scaledProbability"),
                cols.next().unwrap().parse().expect("payoutMultiplier"),
            )
        })
        .collect();

    assert_eq!(rows.len(), 1000, "one row per simulated round");
    for (i, (sim_id, prob, _)) in rows.iter().enumerate() {
        assert_eq!(*sim_id, i as u64 + 1, "simulation ids are 1..=n");
        assert!(*prob <= SCALE, "scaled probability exceeds SCALE");
    }

    // Every payout present in the records appears in the table, with a
    // single probability per payout value.
    let mut prob_by_payout: HashMap<i64, u64> = HashMap::new();
    for (_, prob, payout) in &rows {
        let seen = *prob_by_payout.entry(*payout).or_insert(*prob);
        assert_eq!(seen, *prob, "payout {payout} has two probabilities");
    }
    let record_payouts: HashSet<i64> = agg.records.iter().map(|r| r.payout_cents).collect();
    assert_eq!(
        prob_by_payout.keys().copied().collect::<HashSet<i64>>(),
        record_payouts
    );
}

#[test]
fn probability_mass_shortfall_is_bounded_by_distinct_payout_count() {
    let agg = run_batch(5000, 99);
    let rows = export::lookup_rows(&agg);

    // Sum each distinct payout value's probability once.
    let mut prob_by_payout: HashMap<i64, u64> = HashMap::new();
    for row in &rows {
        prob_by_payout.insert(row.payout_multiplier, row.scaled_probability);
    }
    let mass: u64 = prob_by_payout.values().sum();
    let distinct = prob_by_payout.len() as u64;

    assert!(mass <= SCALE, "probability mass exceeds SCALE");
    assert!(
        SCALE - mass <= distinct,
        "floor-rounding shortfall {} exceeds distinct payout count {}",
        SCALE - mass,
        distinct
    );
}

#[test]
fn index_descriptor_references_the_artifacts_by_filename() {
    let dir = TempDir::new("index-descriptor");
    let agg = run_batch(200, 5);
    let options = ExportOptions {
        mode: "normal".into(),
        cost_multiplier: 100,
        ..ExportOptions::default()
    };
    let bundle =
        export::export_bundle(&agg, &dir.prefix("golf_normal"), &options).expect("export");

    let content = std::fs::read_to_string(&bundle.index).expect("read index");
    let descriptor: IndexDescriptor = serde_json::from_str(&content).expect("parse index");

    assert_eq!(descriptor.mode, "normal");
    assert_eq!(descriptor.cost_multiplier, 100);
    assert_eq!(descriptor.logic_file, "golf_normal_logic.jsonl.zst");
    assert_eq!(descriptor.lookup_file, "golf_normal_lookup.csv");
    // ISO-8601 UTC: "2026-08-28T12:34:56Z".
    assert!(descriptor.created.ends_with('Z'));
    assert!(descriptor.created.contains('T'));

    // The raw JSON uses the wire field names.
    let raw: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert!(raw.get("costMultiplier").is_some());
    assert!(raw.get("logicFile").is_some());
    assert!(raw.get("lookupFile").is_some());
}

#[test]
fn failed_lookup_write_leaves_prior_artifacts_intact() {
    let dir = TempDir::new("failed-write");
    let prefix = dir.prefix("golf_normal");

    let first = run_batch(100, 1);
    let bundle = export::export_bundle(&first, &prefix, &ExportOptions::default())
        .expect("first export");
    let published_lookup = std::fs::read(&bundle.lookup).expect("read lookup");
    let published_index = std::fs::read(&bundle.index).expect("read index");

    // Block the lookup's temporary path: File::create on a directory
    // fails, so the re-export dies mid-bundle.
    std::fs::create_dir(dir.prefix("golf_normal_lookup.csv.tmp")).expect("plant dir");

    let second = run_batch(200, 2);
    let err = export::export_bundle(&second, &prefix, &ExportOptions::default());
    assert!(err.is_err(), "export must fail when the tmp path is blocked");

    // The previously published lookup and index are byte-identical;
    // nothing was overwritten in place.
    assert_eq!(
        std::fs::read(&bundle.lookup).expect("re-read lookup"),
        published_lookup,
        "failed export corrupted the published lookup table"
    );
    assert_eq!(
        std::fs::read(&bundle.index).expect("re-read index"),
        published_index,
        "failed export corrupted the published index descriptor"
    );
}

#[test]
fn prefix_without_a_file_name_is_rejected() {
    let agg = run_batch(10, 1);
    let err = export::export_bundle(
        &agg,
        std::path::Path::new("exports/"),
        &ExportOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, SimError::Configuration(_)));
    assert!(!std::path::Path::new("exports/_logic.jsonl.zst").exists());
}

#[test]
fn no_temporary_files_survive_a_successful_export() {
    let dir = TempDir::new("atomic-publish");
    let agg = run_batch(100, 1);
    export::export_bundle(&agg, &dir.prefix("golf_normal"), &ExportOptions::default())
        .expect("export");

    let leftovers: Vec<String> = std::fs::read_dir(&dir.0)
        .expect("read dir")
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty(), "stale temp files: {leftovers:?}");
}
