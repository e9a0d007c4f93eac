use wf_results::*;

fn manifest(run_id: &str, timestamp: &str) -> RunManifest {
    RunManifest {
        run_id: run_id.to_string(),
        timestamp: timestamp.to_string(),
        pipeline_version: "0.1.0".to_string(),
        inputs: vec![InputDigest {
            name: "scada".to_string(),
            sha256: digest_bytes(b"rows"),
        }],
        config: serde_json::json!({ "grid": { "step_psi": 10.0 } }),
        summary: RunSummary {
            wells_total: 2,
            wells_fitted: 1,
            wells_failed: 1,
            ..RunSummary::default()
        },
    }
}

fn tables() -> RunTables {
    RunTables {
        fits: vec![FitRow {
            well_id: "MPB-28".to_string(),
            reservoir_pressure: 1990.0,
            cumulative_error: 41.5,
            candidates_evaluated: 310,
            samples: 5,
            max_observed_bhp: 1800.0,
            mean_productivity_index: Some(0.9),
        }],
        failures: vec![FailureRow {
            well_id: "MPB-30".to_string(),
            kind: "insufficient_data".to_string(),
            message: "Well MPB-30: insufficient data (1 samples, need 2)".to_string(),
        }],
        fieldwide: vec![
            FieldwideRow {
                calibration: "newest".to_string(),
                sweep_index: 0,
                power_fluid_pressure: 1800.0,
                total_oil_rate: 120.0,
                wells_contributing: 1,
            },
            FieldwideRow {
                calibration: "newest".to_string(),
                sweep_index: 1,
                power_fluid_pressure: 1850.0,
                total_oil_rate: 131.0,
                wells_contributing: 1,
            },
        ],
        ..RunTables::default()
    }
}

#[test]
fn save_and_load_run() {
    let temp_dir = std::env::temp_dir().join("wf_results_test_roundtrip");
    let _ = std::fs::remove_dir_all(&temp_dir);
    let store = RunStore::new(temp_dir.clone()).unwrap();

    let run_dir = store
        .save_run(&manifest("run_a", "2024-06-01T00:00:00Z"), &tables())
        .unwrap();

    assert!(store.has_run("run_a"));
    for file in ["fits.csv", "failures.csv", "lookup.csv", "fieldwide.csv", "coefficients.csv"] {
        assert!(run_dir.join(file).exists(), "{file} missing");
    }

    let loaded = store.load_manifest("run_a").unwrap();
    assert_eq!(loaded.summary.wells_failed, 1);
    assert_eq!(loaded.inputs[0].sha256, digest_bytes(b"rows"));

    let fits = store.load_fits("run_a").unwrap();
    assert_eq!(fits, tables().fits);
    let fieldwide = store.load_fieldwide("run_a").unwrap();
    assert_eq!(fieldwide.len(), 2);
    assert_eq!(fieldwide[1].total_oil_rate, 131.0);

    let _ = std::fs::remove_dir_all(&temp_dir);
}

#[test]
fn missing_run_is_reported() {
    let temp_dir = std::env::temp_dir().join("wf_results_test_missing");
    let _ = std::fs::remove_dir_all(&temp_dir);
    let store = RunStore::new(temp_dir.clone()).unwrap();

    assert!(!store.has_run("nope"));
    assert!(matches!(
        store.load_manifest("nope"),
        Err(ResultsError::RunNotFound { .. })
    ));
    assert!(matches!(
        store.load_fits("nope"),
        Err(ResultsError::RunNotFound { .. })
    ));

    let _ = std::fs::remove_dir_all(&temp_dir);
}

#[test]
fn list_and_delete_runs() {
    let temp_dir = std::env::temp_dir().join("wf_results_test_list");
    let _ = std::fs::remove_dir_all(&temp_dir);
    let store = RunStore::new(temp_dir.clone()).unwrap();

    store
        .save_run(&manifest("run_b", "2024-06-02T00:00:00Z"), &RunTables::default())
        .unwrap();
    store
        .save_run(&manifest("run_a", "2024-06-01T00:00:00Z"), &RunTables::default())
        .unwrap();

    let runs = store.list_runs().unwrap();
    let ids: Vec<&str> = runs.iter().map(|m| m.run_id.as_str()).collect();
    assert_eq!(ids, ["run_a", "run_b"]);

    store.delete_run("run_a").unwrap();
    assert!(!store.has_run("run_a"));
    assert_eq!(store.list_runs().unwrap().len(), 1);

    let _ = std::fs::remove_dir_all(&temp_dir);
}
