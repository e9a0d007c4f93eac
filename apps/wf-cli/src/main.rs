use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use wf_app::{
    AppResult, Calibration, FieldwideRow, PipelineConfig, PipelineProgressEvent, RunRequest, run_service,
};

#[derive(Parser)]
#[command(name = "wf-cli")]
#[command(about = "WellFlow CLI - reservoir pressure and oil rate lookup from SCADA and well tests", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a pipeline config file
    Validate {
        /// Path to the config YAML file
        config_path: PathBuf,
    },
    /// Run the pipeline and store the results
    Run {
        /// SCADA CSV (well_id,timestamp,signal,value)
        scada: PathBuf,
        /// Well test CSV
        well_tests: PathBuf,
        /// Path to the config YAML file; defaults apply when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Run store directory
        #[arg(short, long, default_value = "runs")]
        output: PathBuf,
        /// Skip cache and force re-run
        #[arg(long)]
        no_cache: bool,
    },
    /// List stored runs
    Runs {
        /// Run store directory
        #[arg(short, long, default_value = "runs")]
        output: PathBuf,
    },
    /// Show a stored run
    Show {
        /// Run ID to display
        run_id: String,
        /// Run store directory
        #[arg(short, long, default_value = "runs")]
        output: PathBuf,
    },
}

fn main() -> AppResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { config_path } => cmd_validate(&config_path),
        Commands::Run {
            scada,
            well_tests,
            config,
            output,
            no_cache,
        } => cmd_run(&scada, &well_tests, config.as_deref(), &output, !no_cache),
        Commands::Runs { output } => cmd_runs(&output),
        Commands::Show { run_id, output } => cmd_show(&output, &run_id),
    }
}

fn cmd_validate(config_path: &Path) -> AppResult<()> {
    println!("Validating config: {}", config_path.display());
    let config = PipelineConfig::load_yaml(config_path)?;
    println!("✓ Config is valid");
    if config.well_ids.is_empty() {
        println!("  Wells: all");
    } else {
        println!("  Wells: {}", config.well_ids.len());
    }
    println!(
        "  Sweep: {}..={} psi step {}",
        config.pressure_sweep.start_psi, config.pressure_sweep.end_psi, config.pressure_sweep.step_psi
    );
    Ok(())
}

fn cmd_run(
    scada: &Path,
    well_tests: &Path,
    config_path: Option<&Path>,
    output: &Path,
    use_cache: bool,
) -> AppResult<()> {
    let config = match config_path {
        Some(path) => PipelineConfig::load_yaml(path)?,
        None => PipelineConfig::default(),
    };

    let request = RunRequest {
        config: &config,
        scada_path: scada,
        well_tests_path: well_tests,
        output_dir: output,
        use_cache,
        cancel: None,
    };

    let mut last_emit = Instant::now();
    let mut last_stage = None;
    let response = run_service::ensure_run_with_progress(
        &request,
        Some(&mut |event| {
            let emit_now = last_stage != Some(event.stage) || last_emit.elapsed().as_millis() >= 100;
            if emit_now {
                render_cli_progress(&event);
                last_stage = Some(event.stage);
                last_emit = Instant::now();
            }
        }),
    )?;
    clear_progress_line();
    tracing::info!(
        run_id = %response.run_id,
        cached = response.loaded_from_cache,
        wells_fitted = response.manifest.summary.wells_fitted,
        "run finished"
    );

    if response.loaded_from_cache {
        println!("✓ Loaded from cache: {}", response.run_id);
    } else {
        println!("✓ Run completed: {}", response.run_id);
    }
    println!("  Directory: {}", response.run_dir.display());
    print_summary(&response.manifest.summary);
    Ok(())
}

fn clear_progress_line() {
    print!("\r{}\r", " ".repeat(100));
    let _ = io::stdout().flush();
}

fn render_cli_progress(event: &PipelineProgressEvent) {
    let spinner = ['|', '/', '-', '\\'];
    let spin_idx = ((event.elapsed_wall_s * 10.0) as usize) % spinner.len();
    let mut line = format!(
        "\r{} {}  elapsed={:.2}s",
        spinner[spin_idx],
        event.stage.label(),
        event.elapsed_wall_s
    );
    if let Some(msg) = &event.message {
        line.push_str(&format!("  {}", msg));
    }
    print!("{}", line);
    let _ = io::stdout().flush();
}

fn print_summary(summary: &wf_app::RunSummary) {
    println!("\nRun summary:");
    println!("  Wells:          {}", summary.wells_total);
    println!("  Fitted:         {}", summary.wells_fitted);
    println!("  Failed:         {}", summary.wells_failed);
    println!("  Tests skipped:  {}", summary.tests_skipped);
    println!(
        "  Coefficients:   {} wells from {} daily fits",
        summary.wells_with_coefficient, summary.coefficient_records
    );
    println!("  Lookup rows:    {}", summary.lookup_rows);
}

fn cmd_runs(output: &Path) -> AppResult<()> {
    let runs = run_service::list_runs(output)?;

    if runs.is_empty() {
        println!("No stored runs in {}", output.display());
    } else {
        println!("Stored runs:");
        for manifest in runs {
            println!(
                "  {} ({}, {} wells)",
                manifest.run_id, manifest.timestamp, manifest.summary.wells_total
            );
        }
    }
    Ok(())
}

fn cmd_show(output: &Path, run_id: &str) -> AppResult<()> {
    println!("Loading run: {}", run_id);

    let (manifest, fieldwide) = run_service::load_run(output, run_id)?;

    println!("  Created:  {}", manifest.timestamp);
    println!("  Version:  {}", manifest.pipeline_version);
    for input in &manifest.inputs {
        println!("  Input {}: {}", input.name, input.sha256);
    }
    print_summary(&manifest.summary);

    println!("\nFieldwide oil rate (bbl/day):");
    println!("  {:>10}  {:>12}  {:>12}  {:>12}", "PF psi", "newest", "lowest_bhp", "median_bhp");
    let table = fieldwide_table(&fieldwide);
    for (pf, totals) in table {
        let cell = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |v| format!("{v:.1}"));
        println!(
            "  {:>10.0}  {:>12}  {:>12}  {:>12}",
            pf,
            cell(totals[0]),
            cell(totals[1]),
            cell(totals[2])
        );
    }
    Ok(())
}

/// Fieldwide totals keyed by sweep step, one column per calibration in
/// `Calibration::ALL` order. Rows with an unknown calibration are skipped.
fn fieldwide_table(rows: &[FieldwideRow]) -> Vec<(f64, [Option<f64>; 3])> {
    let mut by_step: BTreeMap<usize, (f64, [Option<f64>; 3])> = BTreeMap::new();
    for row in rows {
        let Some(slot) = Calibration::from_label(&row.calibration)
            .and_then(|c| Calibration::ALL.iter().position(|&a| a == c))
        else {
            tracing::warn!(calibration = %row.calibration, "skipping fieldwide row with unknown calibration");
            continue;
        };
        let entry = by_step
            .entry(row.sweep_index)
            .or_insert((row.power_fluid_pressure, [None; 3]));
        entry.1[slot] = Some(row.total_oil_rate);
    }
    by_step.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(calibration: &str, sweep_index: usize, total: f64) -> FieldwideRow {
        FieldwideRow {
            calibration: calibration.to_string(),
            sweep_index,
            power_fluid_pressure: 1800.0 + 50.0 * sweep_index as f64,
            total_oil_rate: total,
            wells_contributing: 1,
        }
    }

    #[test]
    fn fieldwide_table_spreads_calibrations_into_columns() {
        let rows = [
            row("median_bhp", 1, 30.0),
            row("newest", 0, 10.0),
            row("lowest_bhp", 0, 20.0),
            row("newest", 1, 40.0),
        ];
        let table = fieldwide_table(&rows);
        assert_eq!(table.len(), 2);
        assert_eq!(table[0], (1800.0, [Some(10.0), Some(20.0), None]));
        assert_eq!(table[1], (1850.0, [Some(40.0), None, Some(30.0)]));
    }

    #[test]
    fn unknown_calibration_is_not_filed_under_median() {
        let rows = [row("oldest", 0, 99.0), row("newest", 0, 10.0)];
        let table = fieldwide_table(&rows);
        assert_eq!(table, vec![(1800.0, [Some(10.0), None, None])]);
    }
}
