use good_lp::{ResolutionError, Solution, SolverModel, default_solver};
use itertools::izip;

use crate::{
    error::ZebuError,
    model::SessionModel,
    units::{Euro, KilowattHours},
};

/// Terminal status of one session's optimization.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SolveStatus {
    Optimal,
    Infeasible,
    Unbounded,
    Other,
}

impl SolveStatus {
    #[must_use]
    pub const fn is_optimal(self) -> bool {
        matches!(self, Self::Optimal)
    }
}

/// Realized values of one step's decision variables.
#[derive(Clone, Copy, Debug)]
pub struct StepValues {
    pub battery: KilowattHours,
    pub charge_state: KilowattHours,
    pub grid: KilowattHours,
    pub curtailed: KilowattHours,
}

/// What came back from the solver. Objective, shortfall and step values are
/// only defined for an optimal status.
#[derive(Clone, Debug)]
pub struct SolveOutcome {
    pub status: SolveStatus,
    pub objective: Option<Euro>,
    pub shortfall: Option<KilowattHours>,
    pub steps: Vec<StepValues>,
}

impl SolveOutcome {
    const fn non_optimal(status: SolveStatus) -> Self {
        Self { status, objective: None, shortfall: None, steps: Vec::new() }
    }
}

/// The solving capability, injected so the session pipeline can be exercised
/// against deterministic fakes without a live solver.
pub trait Solve {
    fn solve(&self, model: SessionModel) -> Result<SolveOutcome, ZebuError>;
}

/// The production solver: good_lp over its bundled pure-Rust backend.
#[derive(Clone, Copy, Debug, Default)]
pub struct LinearSolver;

impl Solve for LinearSolver {
    fn solve(&self, model: SessionModel) -> Result<SolveOutcome, ZebuError> {
        let SessionModel { problem, objective, constraints, decision } = model;

        let mut solver = problem.minimise(objective.clone()).using(default_solver);
        for constraint in constraints {
            solver = solver.with(constraint);
        }

        let solution = match solver.solve() {
            Ok(solution) => solution,
            Err(ResolutionError::Infeasible) => {
                return Ok(SolveOutcome::non_optimal(SolveStatus::Infeasible));
            }
            Err(ResolutionError::Unbounded) => {
                return Ok(SolveOutcome::non_optimal(SolveStatus::Unbounded));
            }
            Err(error) => return Err(ZebuError::Solver { reason: error.to_string() }),
        };

        let steps = izip!(
            &decision.battery,
            &decision.charge_state,
            &decision.grid,
            &decision.curtailed
        )
        .map(|(battery, charge_state, grid, curtailed)| StepValues {
            battery: KilowattHours(solution.value(*battery)),
            charge_state: KilowattHours(solution.value(*charge_state)),
            grid: KilowattHours(solution.value(*grid)),
            curtailed: KilowattHours(solution.value(*curtailed)),
        })
        .collect();

        Ok(SolveOutcome {
            status: SolveStatus::Optimal,
            objective: Some(Euro(objective.eval_with(&solution))),
            shortfall: Some(KilowattHours(solution.value(decision.shortfall))),
            steps,
        })
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::model::{self, DisconnectPolicy, tests::{record, test_parameters}};

    /// The reference scenario: three connected steps, solar above load, the
    /// 50 kWh target easily reachable within the charger rating.
    fn solve_reference() -> SolveOutcome {
        let slice: Vec<_> = (0..3).map(|_| record(true, 10.0, 5.0, 0.1)).collect();
        let model = model::build(&slice, &test_parameters()).unwrap();
        LinearSolver.solve(model).unwrap()
    }

    #[test]
    fn test_reference_scenario_is_optimal_with_zero_shortfall() {
        let outcome = solve_reference();
        assert_eq!(outcome.status, SolveStatus::Optimal);
        assert_abs_diff_eq!(outcome.shortfall.unwrap().0, 0.0, epsilon = 1e-6);
        // 50 kWh must come from the grid on top of the 15 kWh net load
        // surplus, all at 0.1 €/kWh and with nothing worth curtailing.
        assert_abs_diff_eq!(outcome.objective.unwrap().0, 3.5, epsilon = 1e-6);
    }

    #[test]
    fn test_energy_balance_holds_at_optimum() {
        let outcome = solve_reference();
        for step in &outcome.steps {
            let residual = 5.0 + step.battery.0 + step.curtailed.0 - 10.0 - step.grid.0;
            assert_abs_diff_eq!(residual, 0.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_charge_state_is_the_integral_of_battery_power() {
        let outcome = solve_reference();
        let mut integral = 0.0;
        for step in &outcome.steps {
            integral += step.battery.0;
            assert_abs_diff_eq!(step.charge_state.0, integral, epsilon = 1e-6);
        }
        assert_abs_diff_eq!(outcome.steps.last().unwrap().charge_state.0, 50.0, epsilon = 1e-6);
    }

    #[test]
    fn test_shortfall_is_tight_when_target_is_unreachable() {
        // One step, 50 kW charger, 80 kWh target: 30 kWh must be missed.
        let slice = vec![record(true, 0.0, 0.0, 0.1)];
        let mut parameters = test_parameters();
        parameters.target_fraction = 0.8;
        let model = model::build(&slice, &parameters).unwrap();
        let outcome = LinearSolver.solve(model).unwrap();
        assert_eq!(outcome.status, SolveStatus::Optimal);
        assert_abs_diff_eq!(outcome.shortfall.unwrap().0, 30.0, epsilon = 1e-6);
    }

    #[test]
    fn test_reset_policy_with_residual_charge_is_infeasible() {
        // A disconnected step cannot shed the charge carried into the gap.
        let slice = vec![record(true, 0.0, 0.0, 0.1), record(false, 0.0, 0.0, 0.1)];
        let mut parameters = test_parameters();
        parameters.initial_charge = KilowattHours(10.0);
        parameters.charger_power = crate::units::Kilowatts(0.0);
        parameters.disconnect_policy = DisconnectPolicy::ResetCharge;
        let model = model::build(&slice, &parameters).unwrap();
        let outcome = LinearSolver.solve(model).unwrap();
        assert_eq!(outcome.status, SolveStatus::Infeasible);
    }
}
