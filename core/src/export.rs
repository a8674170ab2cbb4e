//! Publish-bundle export: logic file, lookup table, index descriptor.
//!
//! Three independent write operations, all pure functions of an
//! Aggregation. Every artifact is written to a temporary sibling path
//! and atomically renamed into place, so an I/O failure never leaves a
//! partial final artifact behind.
//!
//! Artifact set for output prefix `<prefix>`:
//!   <prefix>_logic.jsonl.zst   one book object per unique outcome id,
//!                              newline-delimited JSON, zstd-compressed
//!   <prefix>_lookup.csv        headerless, one row per simulated round:
//!                              simulationId,scaledProbability,payoutMultiplier
//!   <prefix>_index.json        mode/cost/filenames/created descriptor

use crate::{
    aggregate::{AggregateRecord, Aggregation},
    error::{SimError, SimResult},
    event::Book,
    types::Cents,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Fixed-point probability space: probabilities are exported as
/// integers in [0, SCALE], never as floats.
pub const SCALE: u64 = 1_000_000_000_000;

/// Compression level for the logic artifact. A tuning knob, not a
/// correctness contract.
pub const DEFAULT_ZSTD_LEVEL: i32 = 10;

/// One book object as it appears in the logic file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookObject {
    pub id: u64,
    /// Final payout in integer cents of a 1-unit bet.
    pub payout_multiplier: Cents,
    pub events: Book,
    /// Win in bet units: `bet * payoutMultiplier / 100`.
    pub win: f64,
    /// Hyphen-joined hit codes.
    pub path: String,
}

impl BookObject {
    pub fn from_record(record: &AggregateRecord) -> Self {
        Self {
            id: record.id,
            payout_multiplier: record.payout_cents,
            events: record.sample.book.clone(),
            win: record.sample.bet_amount * (record.payout_cents as f64 / 100.0),
            path: record.path.clone(),
        }
    }
}

/// One lookup table row. The table carries one row per simulated round
/// (not per unique record) — the consumer replays every simulation id
/// for weighted sampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupRow {
    pub simulation_id: u64,
    pub scaled_probability: u64,
    pub payout_multiplier: Cents,
}

/// The `<prefix>_index.json` descriptor referencing the other two
/// artifacts by filename.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IndexDescriptor {
    pub mode: String,
    pub cost_multiplier: u64,
    pub logic_file: String,
    pub lookup_file: String,
    /// ISO-8601 UTC creation timestamp.
    pub created: String,
}

#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub mode: String,
    pub cost_multiplier: u64,
    pub zstd_level: i32,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            mode: "normal".into(),
            cost_multiplier: 1,
            zstd_level: DEFAULT_ZSTD_LEVEL,
        }
    }
}

/// Paths of the published artifacts.
#[derive(Debug, Clone)]
pub struct ExportedBundle {
    pub logic: PathBuf,
    pub lookup: PathBuf,
    pub index: PathBuf,
}

/// Build the lookup rows for an aggregation.
///
/// Probability mass is grouped by payout value, not by path: distinct
/// paths sharing a payout cents value fold together, so every row with
/// that payout carries the same scaled probability. Rows are emitted in
/// record id order, each record repeated `weight` times, with
/// simulation ids assigned sequentially from 1.
///
/// Row order is record-grouped, not per-round: simulation id k does
/// not carry round k's payout. The consumer samples by weight, and the
/// (probability, payout) multiset is identical to a per-round emission.
pub fn lookup_rows(aggregation: &Aggregation) -> Vec<LookupRow> {
    let total = aggregation.total_rounds;
    let mut weight_by_payout: HashMap<Cents, u64> = HashMap::new();
    for record in &aggregation.records {
        *weight_by_payout.entry(record.payout_cents).or_insert(0) += record.weight;
    }

    let mut rows = Vec::with_capacity(total as usize);
    let mut simulation_id = 1u64;
    for record in &aggregation.records {
        let group_weight = weight_by_payout[&record.payout_cents];
        // Exact rational floor: group_weight / total scaled to SCALE.
        let scaled = (group_weight as u128 * SCALE as u128 / total as u128) as u64;
        for _ in 0..record.weight {
            rows.push(LookupRow {
                simulation_id,
                scaled_probability: scaled,
                payout_multiplier: record.payout_cents,
            });
            simulation_id += 1;
        }
    }
    rows
}

/// Write the full publish bundle for `prefix` (e.g. "exports/golf_normal").
pub fn export_bundle(
    aggregation: &Aggregation,
    prefix: &Path,
    options: &ExportOptions,
) -> SimResult<ExportedBundle> {
    // A prefix naming a directory ("exports/", "/", "..") would
    // publish artifacts beside it under a stem the caller never chose.
    // Path::file_name() strips a trailing separator, so check the raw
    // string for that case as well.
    let trailing_separator = prefix
        .as_os_str()
        .to_string_lossy()
        .ends_with(&['/', '\\'][..]);
    if prefix.file_name().is_none() || trailing_separator {
        return Err(SimError::Configuration(format!(
            "output prefix '{}' does not name a file stem",
            prefix.display()
        )));
    }

    if let Some(parent) = prefix.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let logic = sibling(prefix, "_logic.jsonl.zst");
    let lookup = sibling(prefix, "_lookup.csv");
    let index = sibling(prefix, "_index.json");

    write_logic(aggregation, &logic, options.zstd_level)?;
    write_lookup(aggregation, &lookup)?;
    write_index(options, &logic, &lookup, &index)?;

    log::info!(
        "published bundle: {} / {} / {}",
        logic.display(),
        lookup.display(),
        index.display()
    );

    Ok(ExportedBundle { logic, lookup, index })
}

/// `<prefix>` + suffix, preserving the prefix's directory.
fn sibling(prefix: &Path, suffix: &str) -> PathBuf {
    let mut name = prefix.file_name().unwrap_or_default().to_os_string();
    name.push(suffix);
    prefix.with_file_name(name)
}

/// One newline-delimited, zstd-compressed book object per unique
/// outcome id, in id order.
fn write_logic(aggregation: &Aggregation, path: &Path, level: i32) -> SimResult<()> {
    let tmp = tmp_path(path);
    {
        let file = File::create(&tmp)?;
        let mut encoder = zstd::stream::Encoder::new(file, level)?;
        for record in &aggregation.records {
            let book = BookObject::from_record(record);
            serde_json::to_writer(&mut encoder, &book)?;
            encoder.write_all(b"\n")?;
        }
        encoder.finish()?;
    }
    std::fs::rename(&tmp, path)?;
    Ok(())
}

/// Headerless delimited table, one row per simulated round.
fn write_lookup(aggregation: &Aggregation, path: &Path) -> SimResult<()> {
    let tmp = tmp_path(path);
    {
        let mut file = File::create(&tmp)?;
        for row in lookup_rows(aggregation) {
            writeln!(
                file,
                "{},{},{}",
                row.simulation_id, row.scaled_probability, row.payout_multiplier
            )?;
        }
    }
    std::fs::rename(&tmp, path)?;
    Ok(())
}

fn write_index(
    options: &ExportOptions,
    logic: &Path,
    lookup: &Path,
    path: &Path,
) -> SimResult<()> {
    let descriptor = IndexDescriptor {
        mode: options.mode.clone(),
        cost_multiplier: options.cost_multiplier,
        logic_file: file_name(logic),
        lookup_file: file_name(lookup),
        created: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
    };

    let tmp = tmp_path(path);
    {
        let mut file = File::create(&tmp)?;
        serde_json::to_writer_pretty(&mut file, &descriptor)?;
        file.write_all(b"\n")?;
    }
    std::fs::rename(&tmp, path)?;
    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
