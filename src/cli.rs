use std::path::PathBuf;

use clap::Parser;
use enumset::EnumSet;

use crate::{
    experiment::{Experiment, SolarEconomics},
    model::{DisconnectPolicy, Parameters},
    units::{Euro, EuroPerKilowattHour, KilowattHours, Kilowatts},
};

#[derive(Parser)]
#[command(author, version, about)]
pub struct Args {
    /// Path to the time-series CSV export.
    #[clap(long, env = "ZEBU_DATA", default_value = "data.csv")]
    pub data: PathBuf,

    /// Directory the charts are written into.
    #[clap(long = "output-dir", env = "ZEBU_OUTPUT_DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Sweep experiments to run after the base pass.
    #[clap(
        long = "experiments",
        env = "ZEBU_EXPERIMENTS",
        value_delimiter = ',',
        num_args = 0..,
        default_value = "solar-capacity,grid-capacity,charger-power,soc-target",
    )]
    pub experiments: Vec<Experiment>,

    #[clap(flatten)]
    pub truck: TruckArgs,

    #[clap(flatten)]
    pub sweeps: SweepArgs,
}

impl Args {
    #[must_use]
    pub fn experiments(&self) -> EnumSet<Experiment> {
        self.experiments.iter().copied().collect()
    }
}

/// The base parameter set. Defaults match the depot the tool was written
/// for: a 400 kWh truck on a 535 kW grid connection.
#[derive(Clone, Copy, Parser)]
pub struct TruckArgs {
    /// Battery capacity of the truck in kilowatt-hours.
    #[clap(long = "battery-capacity-kwh", default_value = "400", env = "BATTERY_CAPACITY_KWH")]
    pub capacity: KilowattHours,

    /// Maximum charge/discharge power in kilowatts.
    #[clap(long = "charger-power-kw", default_value = "100", env = "CHARGER_POWER_KW")]
    pub charger_power: Kilowatts,

    /// Maximum power exchanged with the grid in kilowatts, either direction.
    #[clap(long = "grid-power-kw", default_value = "535", env = "GRID_POWER_KW")]
    pub grid_power: Kilowatts,

    /// State of charge at the start of the data in kilowatt-hours.
    #[clap(long = "initial-charge-kwh", default_value = "0", env = "INITIAL_CHARGE_KWH")]
    pub initial_charge: KilowattHours,

    /// Departure target as a fraction of capacity.
    #[clap(long = "target-fraction", default_value = "0.8", env = "TARGET_FRACTION")]
    pub target_fraction: f64,

    /// Penalty per kilowatt-hour short of the departure target. Keep it
    /// large relative to the price swings, or the target stops binding.
    #[clap(long = "shortfall-penalty", default_value = "1000", env = "SHORTFALL_PENALTY")]
    pub shortfall_penalty: EuroPerKilowattHour,

    /// How to treat disconnected steps inside a session.
    #[clap(
        long = "disconnect-policy",
        default_value = "assume-connected",
        env = "DISCONNECT_POLICY"
    )]
    pub disconnect_policy: DisconnectPolicy,
}

impl TruckArgs {
    /// The single construction point for [`Parameters`]; sweeps clone the
    /// returned value instead of touching shared defaults.
    #[must_use]
    pub fn to_parameters(&self) -> Parameters {
        Parameters {
            capacity: self.capacity,
            charger_power: self.charger_power,
            grid_power: self.grid_power,
            initial_charge: self.initial_charge,
            target_fraction: self.target_fraction,
            shortfall_penalty: self.shortfall_penalty,
            disconnect_policy: self.disconnect_policy,
        }
    }
}

#[derive(Clone, Parser)]
pub struct SweepArgs {
    /// Multipliers for the solar-capacity sweep.
    #[clap(
        long = "solar-multipliers",
        value_delimiter = ',',
        num_args = 1..,
        default_value = "0.5,0.75,1,1.25,1.5,2",
    )]
    pub solar_multipliers: Vec<f64>,

    /// Grid capacities in kilowatts for the grid-capacity sweep.
    #[clap(
        long = "grid-power-values",
        value_delimiter = ',',
        num_args = 1..,
        default_value = "100,200,300,400,535,700",
    )]
    pub grid_power_values: Vec<Kilowatts>,

    /// Charger powers in kilowatts for the charger-power sweep.
    #[clap(
        long = "charger-power-values",
        value_delimiter = ',',
        num_args = 1..,
        default_value = "50,75,100,150,200",
    )]
    pub charger_power_values: Vec<Kilowatts>,

    /// Target fractions for the SoC-target sweep.
    #[clap(
        long = "soc-targets",
        value_delimiter = ',',
        num_args = 1..,
        default_value = "0.5,0.6,0.7,0.8,0.9,1",
    )]
    pub soc_targets: Vec<f64>,

    /// Solar capacity currently installed, backing a multiplier of 1.
    #[clap(long = "solar-capacity-kw", default_value = "1500", env = "SOLAR_CAPACITY_KW")]
    pub current_capacity: Kilowatts,

    /// Installation cost per added kilowatt of solar.
    #[clap(long = "solar-cost-per-kw", default_value = "1250", env = "SOLAR_COST_PER_KW")]
    pub cost_per_kilowatt: Euro,
}

impl SweepArgs {
    #[must_use]
    pub const fn solar_economics(&self) -> SolarEconomics {
        SolarEconomics {
            current_capacity: self.current_capacity,
            cost_per_kilowatt: self.cost_per_kilowatt,
        }
    }
}
