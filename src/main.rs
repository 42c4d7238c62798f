mod chart;
mod cli;
mod data;
mod error;
mod experiment;
mod model;
mod prelude;
mod runner;
mod session;
mod solver;
mod tables;
mod units;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::{
    chart::Line,
    cli::Args,
    data::TimeSeries,
    experiment::{Experiment, Harness},
    prelude::*,
    solver::LinearSolver,
};

fn main() -> Result {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();
    let series = TimeSeries::from_path(&args.data)
        .with_context(|| format!("failed to load `{}`", args.data.display()))?;
    info!(n_records = series.len(), "loaded the time series");

    let parameters = args.truck.to_parameters();
    let solver = LinearSolver;

    let outcome = runner::run(&series, &parameters, &solver);
    println!("{}", tables::session_table(&outcome.sessions));
    info!(
        n_sessions = outcome.session_count(),
        total_cost = %outcome.total_cost,
        total_shortfall = %outcome.total_shortfall,
        "base pass done"
    );

    let harness = Harness::builder().series(&series).base(&parameters).solver(&solver).build();
    let experiments = args.experiments();

    if experiments.contains(Experiment::SolarCapacity) {
        let economics = args.sweeps.solar_economics();
        let rows = harness.sweep_solar_capacity(economics, &args.sweeps.solar_multipliers);
        println!("{}", tables::solar_table(&rows));
        if let Some(best) = experiment::best_solar_row(&rows) {
            info!(
                multiplier = best.multiplier,
                added_megawatts = economics.added_megawatts(best.multiplier),
                net_cost = %best.net_cost,
                "best solar multiplier"
            );
        }
        chart::render_line_chart(
            &args.output_dir.join("solar_capacity_vs_cost.svg"),
            "Solar capacity vs costs",
            "Added solar capacity (MW)",
            "Cost (EUR)",
            &experiment::solar_chart_axis(&rows, economics),
            &[
                Line {
                    label: "Operational cost",
                    values: rows.iter().map(|row| row.operational_cost.0).collect(),
                },
                Line { label: "Net cost", values: rows.iter().map(|row| row.net_cost.0).collect() },
            ],
        )?;
    }

    if experiments.contains(Experiment::GridCapacity) {
        let rows = harness.sweep_grid_capacity(&args.sweeps.grid_power_values);
        println!("{}", tables::grid_table(&rows));
        chart::render_line_chart(
            &args.output_dir.join("grid_capacity_vs_miss.svg"),
            "Grid capacity vs SoC miss",
            "Grid capacity (kW)",
            "Fraction missed",
            &rows.iter().map(|row| row.grid_power.0).collect::<Vec<_>>(),
            &[Line {
                label: "Avg fraction missed",
                values: rows.iter().map(|row| row.miss_fraction).collect(),
            }],
        )?;
    }

    if experiments.contains(Experiment::ChargerPower) {
        let rows = harness.sweep_charger_power(&args.sweeps.charger_power_values);
        println!("{}", tables::charger_table(&rows));
        chart::render_line_chart(
            &args.output_dir.join("charge_power_vs_cost.svg"),
            "Charging power vs cost",
            "Truck charging power (kW)",
            "Total cost (EUR)",
            &rows.iter().map(|row| row.charger_power.0).collect::<Vec<_>>(),
            &[Line {
                label: "Total cost",
                values: rows.iter().map(|row| row.total_cost.0).collect(),
            }],
        )?;
    }

    if experiments.contains(Experiment::SocTarget) {
        let rows = harness.sweep_soc_target(&args.sweeps.soc_targets);
        println!("{}", tables::target_table(&rows));
        chart::render_line_chart(
            &args.output_dir.join("soc_target_vs_cost.svg"),
            "SoC target vs cost",
            "SoC target fraction",
            "Total cost (EUR)",
            &rows.iter().map(|row| row.target_fraction).collect::<Vec<_>>(),
            &[Line {
                label: "Total cost",
                values: rows.iter().map(|row| row.total_cost.0).collect(),
            }],
        )?;
    }

    Ok(())
}
