use good_lp::{Constraint, Expression, ProblemVariables, Variable, constraint, variable};

use crate::{
    data::Record,
    error::ZebuError,
    units::{EuroPerKilowattHour, KilowattHours, Kilowatts},
};

/// How to treat disconnected steps that fall inside a session (the gap
/// between a departure and the truck's return). Both variants keep battery
/// power at zero while the truck is away; they differ in what happens to the
/// tracked charge state.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, clap::ValueEnum)]
pub enum DisconnectPolicy {
    /// The battery holds its charge through the gap.
    #[default]
    AssumeConnected,

    /// The charge state is pinned to zero on every disconnected step. Note
    /// that a gap following a non-empty charge state makes the session
    /// infeasible: the battery cannot shed energy while disconnected.
    ResetCharge,
}

/// Immutable per-session configuration. Sweeps clone the base value and
/// change exactly one field; nothing is ever mutated in place.
#[derive(Clone, Debug)]
pub struct Parameters {
    /// Battery capacity of the truck (`Xmax`).
    pub capacity: KilowattHours,

    /// Maximum charge/discharge power of the charger (`Qb_max`).
    pub charger_power: Kilowatts,

    /// Maximum power exchanged with the grid, either direction (`Qg_max`).
    pub grid_power: Kilowatts,

    /// State of charge at the first step of the series (`X0`).
    pub initial_charge: KilowattHours,

    /// Departure target as a fraction of capacity (`v_target`).
    pub target_fraction: f64,

    /// Penalty per kilowatt-hour short of the departure target (`kappa`).
    /// Must be large relative to the price swings for the target to bind.
    pub shortfall_penalty: EuroPerKilowattHour,

    pub disconnect_policy: DisconnectPolicy,
}

impl Parameters {
    /// The departure target in energy terms.
    #[must_use]
    pub fn target_energy(&self) -> KilowattHours {
        KilowattHours(self.target_fraction * self.capacity.0)
    }
}

/// Handles of the decision variables, one entry per session step plus the
/// scalar shortfall. Kept so solutions can be read back by name instead of
/// positional lookup.
#[derive(Debug)]
pub struct SessionVariables {
    /// Battery charge (positive) or discharge (negative) power, `b_t`.
    pub battery: Vec<Variable>,

    /// State of charge, `x_t`.
    pub charge_state: Vec<Variable>,

    /// Grid import (positive) or export (negative), `g_t`.
    pub grid: Vec<Variable>,

    /// Curtailed solar energy, `a_t`.
    pub curtailed: Vec<Variable>,

    /// Energy short of the departure target, `gamma`.
    pub shortfall: Variable,
}

/// One session's linear program, ready to hand to a [`crate::solver::Solve`]
/// implementation. Lives only for the duration of a single solve call.
pub struct SessionModel {
    pub problem: ProblemVariables,
    pub objective: Expression,
    pub constraints: Vec<Constraint>,
    pub decision: SessionVariables,
}

impl std::fmt::Debug for SessionModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionModel")
            .field("objective", &self.objective)
            .field("decision", &self.decision)
            .finish_non_exhaustive()
    }
}

/// Builds the linear program for one session slice.
///
/// The formulation, per step `t` of the slice:
/// - connectivity: `-Qb_max * δ_t <= b_t <= Qb_max * δ_t`;
/// - charge dynamics: `x_0 = X0 + b_0`, `x_t = x_{t-1} + b_t` (no round-trip
///   losses);
/// - curtailment bound: `0 <= a_t <= solar_t`;
/// - energy balance: `load_t + b_t + a_t = solar_t + g_t`;
/// - departure target: `x_{T-1} >= v_target * Xmax - gamma`;
/// - objective: minimize `sum(price_t * g_t) + kappa * gamma`.
pub fn build(slice: &[Record], parameters: &Parameters) -> Result<SessionModel, ZebuError> {
    let horizon = slice.len();
    if horizon == 0 {
        return Err(ZebuError::EmptySession);
    }

    let charger_power = parameters.charger_power.0;
    let grid_power = parameters.grid_power.0;

    let mut problem = ProblemVariables::new();
    let battery = problem.add_vector(variable().min(-charger_power).max(charger_power), horizon);
    let charge_state = problem.add_vector(variable().min(0.0).max(parameters.capacity.0), horizon);
    let grid = problem.add_vector(variable().min(-grid_power).max(grid_power), horizon);
    let curtailed: Vec<Variable> =
        slice.iter().map(|record| problem.add(variable().min(0.0).max(record.solar.0))).collect();
    let shortfall = problem.add(variable().min(0.0));

    let mut constraints = Vec::new();

    // Battery power is zero whenever the truck is away, otherwise bounded by
    // the charger rating.
    for (t, record) in slice.iter().enumerate() {
        let connected = if record.truck_connected { 1.0 } else { 0.0 };
        constraints.push(constraint!(battery[t] <= charger_power * connected));
        constraints.push(constraint!(battery[t] >= -charger_power * connected));
    }

    // The charge state is the running integral of battery power.
    constraints.push(constraint!(charge_state[0] - battery[0] == parameters.initial_charge.0));
    for t in 1..horizon {
        constraints.push(constraint!(charge_state[t] - charge_state[t - 1] - battery[t] == 0.0));
    }

    if parameters.disconnect_policy == DisconnectPolicy::ResetCharge {
        for (t, record) in slice.iter().enumerate() {
            if !record.truck_connected {
                constraints.push(constraint!(charge_state[t] == 0.0));
            }
        }
    }

    // Conservation at every step: demand plus net charging plus curtailment
    // equals solar generation plus net grid import.
    for (t, record) in slice.iter().enumerate() {
        constraints.push(constraint!(
            battery[t] + curtailed[t] - grid[t] == record.solar.0 - record.load.0
        ));
    }

    // Soft departure target: the shortfall absorbs whatever the final charge
    // state misses.
    constraints
        .push(constraint!(charge_state[horizon - 1] + shortfall >= parameters.target_energy().0));

    let objective = slice
        .iter()
        .enumerate()
        .map(|(t, record)| record.price.0 * grid[t])
        .sum::<Expression>()
        + parameters.shortfall_penalty.0 * shortfall;

    Ok(SessionModel {
        problem,
        objective,
        constraints,
        decision: SessionVariables { battery, charge_state, grid, curtailed, shortfall },
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::data::Record;

    pub fn test_parameters() -> Parameters {
        Parameters {
            capacity: KilowattHours(100.0),
            charger_power: Kilowatts(50.0),
            grid_power: Kilowatts(50.0),
            initial_charge: KilowattHours::ZERO,
            target_fraction: 0.5,
            shortfall_penalty: EuroPerKilowattHour(1000.0),
            disconnect_policy: DisconnectPolicy::AssumeConnected,
        }
    }

    pub fn record(connected: bool, solar: f64, load: f64, price: f64) -> Record {
        Record {
            time: String::new(),
            truck_connected: connected,
            solar: KilowattHours(solar),
            load: KilowattHours(load),
            price: EuroPerKilowattHour(price),
        }
    }

    #[test]
    fn test_empty_session_is_rejected() {
        let error = build(&[], &test_parameters()).unwrap_err();
        assert!(matches!(error, ZebuError::EmptySession));
    }

    #[test]
    fn test_constraint_count() {
        // Per step: 2 connectivity + 1 dynamics + 1 balance; plus the target.
        let slice: Vec<Record> = (0..3).map(|_| record(true, 10.0, 5.0, 0.1)).collect();
        let model = build(&slice, &test_parameters()).unwrap();
        assert_eq!(model.constraints.len(), 4 * 3 + 1);
        assert_eq!(model.decision.battery.len(), 3);
        assert_eq!(model.decision.curtailed.len(), 3);
    }

    #[test]
    fn test_reset_policy_adds_pinning_constraints() {
        let slice =
            vec![record(true, 0.0, 1.0, 0.1), record(false, 0.0, 1.0, 0.1), record(true, 0.0, 1.0, 0.1)];
        let mut parameters = test_parameters();
        parameters.disconnect_policy = DisconnectPolicy::ResetCharge;
        let model = build(&slice, &parameters).unwrap();
        // One extra constraint for the single disconnected step.
        assert_eq!(model.constraints.len(), 4 * 3 + 1 + 1);
    }
}
