use std::fs;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use wardflow_sim::config::Config;
use wardflow_sim::engine::Engine;

/// Run a discrete-event simulation of patient flow through a hospital.
#[derive(Debug, Parser)]
#[command(name = "wardflow-sim", version, about)]
struct Cli {
    /// Named hospital preset (baseline, bellevue-baseline, bellevue-enhanced,
    /// jackson-baseline, jackson-enhanced, cedars-baseline, cedars-enhanced).
    #[arg(long, default_value = "baseline", conflicts_with = "config")]
    preset: String,

    /// Path to a YAML config file overriding the preset entirely.
    #[arg(long)]
    config: Option<String>,

    /// Override the RNG seed for reproducible runs.
    #[arg(long)]
    seed: Option<u64>,

    /// Override the simulated number of days.
    #[arg(long)]
    days: Option<u32>,

    /// Emit the report as JSON instead of a human-readable summary.
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => {
            let contents = fs::read_to_string(path).with_context(|| format!("failed to read {path}"))?;
            Config::from_yaml_str(&contents)?
        }
        None => Config::preset(&cli.preset)?,
    };

    if let Some(seed) = cli.seed {
        config.rng_seed = seed;
    }
    if let Some(days) = cli.days {
        config.sim_days = days;
    }

    let engine = Engine::new(config);
    let report = engine.run();

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Arrivals:           {}", report.total_arrivals);
        println!("Discharges:         {}", report.total_discharges);
        println!("Avg length of stay: {:.1} min", report.average_length_of_stay_minutes);
        println!("Avg ED boarding:    {:.1} min", report.average_ed_boarding_wait_minutes);
        println!("Avg satisfaction:   {:.1}", report.average_satisfaction_score);
        println!("Imaging studies:    {}", report.imaging_studies_completed);
        println!("Lab studies:        {}", report.lab_studies_completed);
        println!("CDU admissions:     {}", report.cdu_admissions);
        println!("CDU discharge rate: {:.2}", report.cdu_discharge_rate);
        println!("Imaging TAT (all/critical/ED-CDU): {:.1} / {:.1} / {:.1}",
            report.average_overall_imaging_tat, report.average_critical_imaging_tat, report.average_ed_cdu_imaging_tat);
        println!("Transfer time to admit: {:.1} min", report.average_transfer_time_to_admit);
        println!("ED wait for transport:  {:.1} min", report.average_ed_wait_for_transport);
        println!("Pulley occupancy/utilization: {:.2} / {:.2}", report.pulley_avg_occupancy, report.pulley_avg_utilization);
        println!("Total operating cost: ${:.2} (normal ${:.2}, overtime ${:.2})",
            report.total_operating_cost, report.total_normal_cost, report.total_overtime_cost);
        println!("Occupancy by unit:");
        let mut units: Vec<_> = report.average_occupancy.iter().collect();
        units.sort_by_key(|(name, _)| name.to_string());
        for (unit, avg) in units {
            println!("  {unit:<12} {avg:.2}");
        }
    }

    Ok(())
}
