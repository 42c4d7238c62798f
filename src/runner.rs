use crate::{
    data::TimeSeries,
    model::{self, Parameters},
    prelude::*,
    session::{self, Session},
    solver::{Solve, SolveStatus},
    units::{Euro, KilowattHours},
};

/// Result of one session's solve, kept for the report table. Cost and
/// shortfall are `None` when the solve did not end optimal.
#[derive(Clone, Debug)]
pub struct SessionMetrics {
    pub session: Session,
    pub status: SolveStatus,
    pub cost: Option<Euro>,
    pub shortfall: Option<KilowattHours>,
}

/// Aggregated totals over the whole series. Sessions without an optimal
/// solve contribute zero to the totals but stay visible in `sessions`.
#[derive(Clone, Debug, Default)]
pub struct RunOutcome {
    pub total_cost: Euro,
    pub total_shortfall: KilowattHours,
    pub sessions: Vec<SessionMetrics>,
}

impl RunOutcome {
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Divisors are clamped to one so that a session-free series cannot
    /// divide by zero.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    fn divisor(&self) -> f64 {
        self.sessions.len().max(1) as f64
    }

    #[must_use]
    pub fn average_cost(&self) -> Euro {
        self.total_cost / self.divisor()
    }

    #[must_use]
    pub fn average_shortfall(&self) -> KilowattHours {
        self.total_shortfall / self.divisor()
    }
}

/// Segments the series, solves every session independently, and aggregates.
///
/// Sessions are strictly sequential and share no state; a failed or
/// non-optimal solve degrades that session only and never aborts the run.
#[instrument(skip_all, fields(n_records = series.len()))]
pub fn run(series: &TimeSeries, parameters: &Parameters, solver: &impl Solve) -> RunOutcome {
    let mut outcome = RunOutcome::default();

    for session in session::sessions(&series.connectivity()) {
        let slice = series.slice(session.range());
        let metrics = match model::build(slice, parameters).and_then(|model| solver.solve(model)) {
            Ok(solved) => {
                if let (Some(cost), Some(shortfall)) = (solved.objective, solved.shortfall) {
                    outcome.total_cost += cost;
                    outcome.total_shortfall += shortfall;
                } else {
                    warn!(start = session.start, end = session.end, status = ?solved.status, "session not optimal");
                }
                SessionMetrics {
                    session,
                    status: solved.status,
                    cost: solved.objective,
                    shortfall: solved.shortfall,
                }
            }
            Err(error) => {
                warn!(start = session.start, end = session.end, %error, "session solve failed");
                SessionMetrics { session, status: SolveStatus::Other, cost: None, shortfall: None }
            }
        };
        debug!(
            start = metrics.session.start,
            end = metrics.session.end,
            cost = metrics.cost.map(|cost| cost.0),
            "session done"
        );
        outcome.sessions.push(metrics);
    }

    outcome
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::{
        data::TimeSeries,
        error::ZebuError,
        model::tests::{record, test_parameters},
        solver::{LinearSolver, SolveOutcome},
        units::Kilowatts,
    };

    fn two_session_series() -> TimeSeries {
        // Departures at 1 and 3: sessions [0, 1] and [2, 3].
        TimeSeries::from_records(vec![
            record(true, 10.0, 5.0, 0.1),
            record(true, 10.0, 5.0, 0.1),
            record(false, 10.0, 5.0, 0.1),
            record(true, 10.0, 5.0, 0.1),
            record(false, 0.0, 5.0, 0.1),
        ])
    }

    #[test]
    fn test_run_aggregates_all_sessions() {
        let outcome = run(&two_session_series(), &test_parameters(), &LinearSolver);
        assert_eq!(outcome.session_count(), 2);
        assert!(outcome.sessions.iter().all(|metrics| metrics.status.is_optimal()));
        assert_abs_diff_eq!(
            outcome.total_cost.0,
            outcome.sessions.iter().filter_map(|metrics| metrics.cost).map(|cost| cost.0).sum::<f64>(),
            epsilon = 1e-9,
        );
    }

    #[test]
    fn test_run_is_idempotent() {
        let series = two_session_series();
        let parameters = test_parameters();
        let first = run(&series, &parameters, &LinearSolver);
        let second = run(&series, &parameters, &LinearSolver);
        assert_eq!(first.total_cost, second.total_cost);
        assert_eq!(first.total_shortfall, second.total_shortfall);
    }

    #[test]
    fn test_relaxing_the_grid_bound_never_hurts() {
        let series = two_session_series();
        let mut tight = test_parameters();
        tight.grid_power = Kilowatts(5.0);
        let mut loose = test_parameters();
        loose.grid_power = Kilowatts(50.0);
        let tight_outcome = run(&series, &tight, &LinearSolver);
        let loose_outcome = run(&series, &loose, &LinearSolver);
        assert!(loose_outcome.total_cost.0 <= tight_outcome.total_cost.0 + 1e-6);
        assert!(loose_outcome.total_shortfall.0 <= tight_outcome.total_shortfall.0 + 1e-6);
    }

    #[test]
    fn test_no_sessions_no_divide_by_zero() {
        let series = TimeSeries::from_records(vec![record(false, 0.0, 1.0, 0.1)]);
        let outcome = run(&series, &test_parameters(), &LinearSolver);
        assert_eq!(outcome.session_count(), 0);
        assert_eq!(outcome.average_cost(), Euro::ZERO);
    }

    /// Always reports infeasibility without touching the model.
    struct InfeasibleSolver;

    impl Solve for InfeasibleSolver {
        fn solve(&self, _: crate::model::SessionModel) -> Result<SolveOutcome, ZebuError> {
            Ok(SolveOutcome {
                status: SolveStatus::Infeasible,
                objective: None,
                shortfall: None,
                steps: Vec::new(),
            })
        }
    }

    /// Always fails, as a crashed or unlicensed backend would.
    struct BrokenSolver;

    impl Solve for BrokenSolver {
        fn solve(&self, _: crate::model::SessionModel) -> Result<SolveOutcome, ZebuError> {
            Err(ZebuError::Solver { reason: "broken on purpose".to_string() })
        }
    }

    #[test]
    fn test_infeasible_sessions_are_visible_but_excluded_from_totals() {
        let outcome = run(&two_session_series(), &test_parameters(), &InfeasibleSolver);
        assert_eq!(outcome.session_count(), 2);
        assert_eq!(outcome.total_cost, Euro::ZERO);
        assert!(outcome.sessions.iter().all(|metrics| metrics.cost.is_none()));
    }

    #[test]
    fn test_solver_failures_do_not_abort_the_run() {
        let outcome = run(&two_session_series(), &test_parameters(), &BrokenSolver);
        assert_eq!(outcome.session_count(), 2);
        assert_eq!(outcome.total_cost, Euro::ZERO);
        assert!(outcome.sessions.iter().all(|metrics| metrics.status == SolveStatus::Other));
    }
}
