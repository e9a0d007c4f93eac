//! Run storage API.
//!
//! Layout: `<root>/<run_id>/manifest.json` plus one CSV file per table.

use crate::types::{FieldwideRow, FitRow, RunManifest, RunTables};
use crate::{ResultsError, ResultsResult};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

pub const MANIFEST_FILE: &str = "manifest.json";
pub const FITS_FILE: &str = "fits.csv";
pub const FAILURES_FILE: &str = "failures.csv";
pub const IPR_CURVES_FILE: &str = "ipr_curves.csv";
pub const COEFFICIENTS_RAW_FILE: &str = "coefficients_raw.csv";
pub const COEFFICIENTS_FILE: &str = "coefficients.csv";
pub const LOOKUP_FILE: &str = "lookup.csv";
pub const FIELDWIDE_FILE: &str = "fieldwide.csv";

#[derive(Clone)]
pub struct RunStore {
    root_dir: PathBuf,
}

impl RunStore {
    pub fn new(root_dir: PathBuf) -> ResultsResult<Self> {
        if !root_dir.exists() {
            fs::create_dir_all(&root_dir)?;
        }
        Ok(Self { root_dir })
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    pub fn run_dir(&self, run_id: &str) -> PathBuf {
        self.root_dir.join(run_id)
    }

    pub fn has_run(&self, run_id: &str) -> bool {
        self.run_dir(run_id).join(MANIFEST_FILE).exists()
    }

    /// Write the manifest and every table. An existing run with the same id is
    /// overwritten.
    pub fn save_run(&self, manifest: &RunManifest, tables: &RunTables) -> ResultsResult<PathBuf> {
        let run_dir = self.run_dir(&manifest.run_id);
        fs::create_dir_all(&run_dir)?;

        write_csv(&run_dir.join(FITS_FILE), &tables.fits)?;
        write_csv(&run_dir.join(FAILURES_FILE), &tables.failures)?;
        write_csv(&run_dir.join(IPR_CURVES_FILE), &tables.ipr_curves)?;
        write_csv(&run_dir.join(COEFFICIENTS_RAW_FILE), &tables.coefficients_raw)?;
        write_csv(&run_dir.join(COEFFICIENTS_FILE), &tables.coefficients)?;
        write_csv(&run_dir.join(LOOKUP_FILE), &tables.lookup)?;
        write_csv(&run_dir.join(FIELDWIDE_FILE), &tables.fieldwide)?;

        // manifest last so a partial run is never reported by has_run
        let manifest_json = serde_json::to_string_pretty(manifest)?;
        fs::write(run_dir.join(MANIFEST_FILE), manifest_json)?;

        Ok(run_dir)
    }

    pub fn load_manifest(&self, run_id: &str) -> ResultsResult<RunManifest> {
        let manifest_path = self.run_dir(run_id).join(MANIFEST_FILE);

        if !manifest_path.exists() {
            return Err(ResultsError::RunNotFound {
                run_id: run_id.to_string(),
            });
        }

        let content = fs::read_to_string(manifest_path)?;
        let manifest = serde_json::from_str(&content)?;
        Ok(manifest)
    }

    pub fn load_fits(&self, run_id: &str) -> ResultsResult<Vec<FitRow>> {
        self.load_table(run_id, FITS_FILE)
    }

    pub fn load_fieldwide(&self, run_id: &str) -> ResultsResult<Vec<FieldwideRow>> {
        self.load_table(run_id, FIELDWIDE_FILE)
    }

    fn load_table<T: DeserializeOwned>(&self, run_id: &str, file: &str) -> ResultsResult<Vec<T>> {
        if !self.has_run(run_id) {
            return Err(ResultsError::RunNotFound {
                run_id: run_id.to_string(),
            });
        }
        let mut reader = csv::Reader::from_path(self.run_dir(run_id).join(file))?;
        let mut rows: Vec<T> = Vec::new();
        for row in reader.deserialize::<T>() {
            rows.push(row?);
        }
        Ok(rows)
    }

    /// Manifests of every stored run, oldest first.
    pub fn list_runs(&self) -> ResultsResult<Vec<RunManifest>> {
        let mut runs = Vec::new();

        if !self.root_dir.exists() {
            return Ok(runs);
        }

        for entry in fs::read_dir(&self.root_dir)? {
            let entry = entry?;
            if entry.path().is_dir() {
                let run_id = entry.file_name().to_string_lossy().to_string();
                if let Ok(manifest) = self.load_manifest(&run_id) {
                    runs.push(manifest);
                }
            }
        }

        runs.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.run_id.cmp(&b.run_id)));
        Ok(runs)
    }

    pub fn delete_run(&self, run_id: &str) -> ResultsResult<()> {
        let run_dir = self.run_dir(run_id);
        if run_dir.exists() {
            fs::remove_dir_all(run_dir)?;
        }
        Ok(())
    }
}

fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> ResultsResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}
