//! CSV input loading.
//!
//! SCADA files are long format with columns `well_id,timestamp,signal,value`.
//! Well test files carry `well_id,test_date` plus the optional numeric columns
//! `total_fluid_rate,oil_volume,watercut,tubing_pressure`. Numeric text is
//! cleaned with [`parse_numeric`]; rows that cannot be used are counted and
//! dropped rather than failing the load.

use crate::error::{AppError, AppResult};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use std::fs::File;
use std::path::Path;
use wf_core::WellId;
use wf_data::{ScadaRow, Signal, WellTest, parse_numeric, to_naive_utc};

const DATETIME_FORMATS: [&str; 5] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

/// Parse a timestamp to naive UTC. Zoned input is converted; naive input is
/// taken to be UTC already; a bare date means midnight.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(to_naive_utc(&ts));
    }
    if let Some(ts) = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
    {
        return Some(ts);
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

#[derive(Debug, Deserialize)]
struct RawScadaRow {
    #[serde(alias = "well", alias = "Well")]
    well_id: String,
    #[serde(alias = "Timestamp", alias = "time")]
    timestamp: String,
    #[serde(alias = "Signal", alias = "tag")]
    signal: String,
    #[serde(alias = "Value")]
    value: String,
}

#[derive(Debug, Deserialize)]
struct RawWellTest {
    #[serde(alias = "well", alias = "Well")]
    well_id: String,
    #[serde(alias = "date", alias = "TestDate")]
    test_date: String,
    #[serde(default)]
    total_fluid_rate: String,
    #[serde(default)]
    oil_volume: String,
    #[serde(default)]
    watercut: String,
    #[serde(default)]
    tubing_pressure: String,
}

#[derive(Debug, Clone, Default)]
pub struct ScadaLoad {
    pub rows: Vec<ScadaRow>,
    /// Malformed records, rows with an unparsable timestamp or value, or a
    /// blank well
    pub rejected: usize,
    /// Rows for signals the pipeline does not use
    pub ignored_signals: usize,
}

#[derive(Debug, Clone, Default)]
pub struct WellTestLoad {
    pub tests: Vec<WellTest>,
    /// Malformed records, or rows with a blank well or unparsable date
    pub rejected: usize,
}

fn csv_reader<R: std::io::Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader)
}

/// Short or malformed records count as rejected rows. Read failures of the
/// underlying stream still fail the load.
fn usable_record<T>(record: Result<T, csv::Error>, rejected: &mut usize) -> AppResult<Option<T>> {
    match record {
        Ok(raw) => Ok(Some(raw)),
        Err(err) if err.is_io_error() => Err(err.into()),
        Err(err) => {
            tracing::debug!("dropping malformed CSV record: {err}");
            *rejected += 1;
            Ok(None)
        }
    }
}

fn open(path: &Path) -> AppResult<File> {
    File::open(path).map_err(|source| AppError::InputRead {
        path: path.to_path_buf(),
        source,
    })
}

pub fn read_scada<R: std::io::Read>(reader: R) -> AppResult<ScadaLoad> {
    let mut load = ScadaLoad::default();

    for record in csv_reader(reader).deserialize::<RawScadaRow>() {
        let Some(raw) = usable_record(record, &mut load.rejected)? else {
            continue;
        };
        let signal = match raw.signal.parse::<Signal>() {
            Ok(signal) => signal,
            Err(_) => {
                load.ignored_signals += 1;
                continue;
            }
        };
        let (Some(timestamp), Some(value)) = (parse_timestamp(&raw.timestamp), parse_numeric(&raw.value))
        else {
            load.rejected += 1;
            continue;
        };
        if raw.well_id.trim().is_empty() {
            load.rejected += 1;
            continue;
        }
        load.rows.push(ScadaRow {
            well_id: WellId::normalized(&raw.well_id),
            timestamp,
            signal,
            value,
        });
    }

    tracing::debug!(
        rows = load.rows.len(),
        rejected = load.rejected,
        ignored = load.ignored_signals,
        "SCADA rows read"
    );
    Ok(load)
}

pub fn load_scada(path: &Path) -> AppResult<ScadaLoad> {
    read_scada(open(path)?)
}

pub fn read_well_tests<R: std::io::Read>(reader: R) -> AppResult<WellTestLoad> {
    let mut load = WellTestLoad::default();

    for record in csv_reader(reader).deserialize::<RawWellTest>() {
        let Some(raw) = usable_record(record, &mut load.rejected)? else {
            continue;
        };
        let Some(test_date) = parse_timestamp(&raw.test_date) else {
            load.rejected += 1;
            continue;
        };
        if raw.well_id.trim().is_empty() {
            load.rejected += 1;
            continue;
        }
        load.tests.push(WellTest {
            well_id: WellId::normalized(&raw.well_id),
            test_date,
            total_fluid_rate: parse_numeric(&raw.total_fluid_rate),
            oil_volume: parse_numeric(&raw.oil_volume),
            watercut: parse_numeric(&raw.watercut),
            tubing_pressure: parse_numeric(&raw.tubing_pressure),
        });
    }

    tracing::debug!(tests = load.tests.len(), rejected = load.rejected, "well tests read");
    Ok(load)
}

pub fn load_well_tests(path: &Path) -> AppResult<WellTestLoad> {
    read_well_tests(open(path)?)
}
