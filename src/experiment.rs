use bon::Builder;
use itertools::Itertools;
use ordered_float::OrderedFloat;

use crate::{
    data::TimeSeries,
    model::Parameters,
    prelude::*,
    runner,
    solver::Solve,
    units::{Euro, KilowattHours, Kilowatts},
};

/// The available sensitivity sweeps.
#[derive(Debug, clap::ValueEnum, enumset::EnumSetType)]
pub enum Experiment {
    SolarCapacity,
    GridCapacity,
    ChargerPower,
    SocTarget,
}

/// Economics of adding solar panels, used by the solar-capacity sweep only.
#[derive(Clone, Copy, Debug)]
pub struct SolarEconomics {
    /// Currently installed solar capacity behind a multiplier of 1.
    pub current_capacity: Kilowatts,

    /// Installation cost per added kilowatt.
    pub cost_per_kilowatt: Euro,
}

impl SolarEconomics {
    /// `max(0, (m - 1) * current_capacity) * cost_per_kW`: scaling down is
    /// free, scaling up is billed per added kilowatt.
    #[must_use]
    pub fn install_cost(&self, multiplier: f64) -> Euro {
        self.cost_per_kilowatt * ((multiplier - 1.0) * self.current_capacity.0).max(0.0)
    }

    /// Capacity added by a multiplier, in megawatts, for the chart axis.
    #[must_use]
    pub fn added_megawatts(&self, multiplier: f64) -> f64 {
        (multiplier - 1.0) * self.current_capacity.0 / 1000.0
    }
}

#[derive(Clone, Debug)]
pub struct SolarRow {
    pub multiplier: f64,
    pub operational_cost: Euro,
    pub install_cost: Euro,
    pub net_cost: Euro,
}

#[derive(Clone, Debug)]
pub struct GridRow {
    pub grid_power: Kilowatts,
    pub average_shortfall: KilowattHours,
    /// Average shortfall as a fraction of the target energy.
    pub miss_fraction: f64,
    pub average_cost: Euro,
}

#[derive(Clone, Debug)]
pub struct ChargerRow {
    pub charger_power: Kilowatts,
    pub total_cost: Euro,
    pub average_cost: Euro,
}

#[derive(Clone, Debug)]
pub struct TargetRow {
    pub target_fraction: f64,
    pub total_cost: Euro,
    pub average_shortfall: KilowattHours,
    pub average_cost: Euro,
}

/// Runs the full session pipeline once per swept value, cloning the base
/// parameters each time. Rows come back in input order; sweep points are
/// independent of each other.
#[derive(Builder)]
pub struct Harness<'a, S> {
    series: &'a TimeSeries,
    base: &'a Parameters,
    solver: &'a S,
}

impl<S: Solve> Harness<'_, S> {
    #[instrument(name = "solar capacity sweep", skip_all)]
    pub fn sweep_solar_capacity(
        &self,
        economics: SolarEconomics,
        multipliers: &[f64],
    ) -> Vec<SolarRow> {
        multipliers
            .iter()
            .map(|&multiplier| {
                let scaled = self.series.with_scaled_solar(multiplier);
                let outcome = runner::run(&scaled, self.base, self.solver);
                let install_cost = economics.install_cost(multiplier);
                let row = SolarRow {
                    multiplier,
                    operational_cost: outcome.total_cost,
                    install_cost,
                    net_cost: outcome.total_cost + install_cost,
                };
                info!(
                    multiplier,
                    operational_cost = %row.operational_cost,
                    net_cost = %row.net_cost,
                    "swept"
                );
                row
            })
            .collect()
    }

    #[instrument(name = "grid capacity sweep", skip_all)]
    pub fn sweep_grid_capacity(&self, values: &[Kilowatts]) -> Vec<GridRow> {
        values
            .iter()
            .map(|&grid_power| {
                let mut parameters = self.base.clone();
                parameters.grid_power = grid_power;
                let outcome = runner::run(self.series, &parameters, self.solver);
                let average_shortfall = outcome.average_shortfall();
                let row = GridRow {
                    grid_power,
                    average_shortfall,
                    miss_fraction: average_shortfall.0 / parameters.target_energy().0,
                    average_cost: outcome.average_cost(),
                };
                info!(
                    grid_power = %row.grid_power,
                    average_shortfall = %row.average_shortfall,
                    miss_fraction = row.miss_fraction,
                    average_cost = %row.average_cost,
                    "swept"
                );
                row
            })
            .collect()
    }

    #[instrument(name = "charger power sweep", skip_all)]
    pub fn sweep_charger_power(&self, values: &[Kilowatts]) -> Vec<ChargerRow> {
        values
            .iter()
            .map(|&charger_power| {
                let mut parameters = self.base.clone();
                parameters.charger_power = charger_power;
                let outcome = runner::run(self.series, &parameters, self.solver);
                let row = ChargerRow {
                    charger_power,
                    total_cost: outcome.total_cost,
                    average_cost: outcome.average_cost(),
                };
                info!(
                    charger_power = %row.charger_power,
                    total_cost = %row.total_cost,
                    average_cost = %row.average_cost,
                    "swept"
                );
                row
            })
            .collect()
    }

    #[instrument(name = "SoC target sweep", skip_all)]
    pub fn sweep_soc_target(&self, targets: &[f64]) -> Vec<TargetRow> {
        targets
            .iter()
            .map(|&target_fraction| {
                let mut parameters = self.base.clone();
                parameters.target_fraction = target_fraction;
                let outcome = runner::run(self.series, &parameters, self.solver);
                let row = TargetRow {
                    target_fraction,
                    total_cost: outcome.total_cost,
                    average_shortfall: outcome.average_shortfall(),
                    average_cost: outcome.average_cost(),
                };
                info!(
                    target_fraction,
                    total_cost = %row.total_cost,
                    average_shortfall = %row.average_shortfall,
                    average_cost = %row.average_cost,
                    "swept"
                );
                row
            })
            .collect()
    }
}

/// The multiplier with the lowest net cost, if the sweep produced any rows.
#[must_use]
pub fn best_solar_row(rows: &[SolarRow]) -> Option<&SolarRow> {
    rows.iter().min_by_key(|row| OrderedFloat(row.net_cost.0))
}

/// X axis shared by both lines of the solar chart.
#[must_use]
pub fn solar_chart_axis(rows: &[SolarRow], economics: SolarEconomics) -> Vec<f64> {
    rows.iter().map(|row| economics.added_megawatts(row.multiplier)).collect_vec()
}
