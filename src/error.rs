use thiserror::Error;

/// Domain errors with a defined degradation policy: schema and read errors
/// abort the run, solver errors degrade the affected session only.
#[derive(Debug, Error)]
pub enum ZebuError {
    /// The input table is missing a required column. Fatal: nothing is
    /// processed before the header check passes.
    #[error("the input table is missing the required column `{column}`")]
    Schema { column: &'static str },

    #[error("failed to read the input table")]
    Csv(#[from] csv::Error),

    /// A session slice of zero length reached the model builder.
    #[error("cannot build a model for an empty session")]
    EmptySession,

    /// The solver backend failed to return a terminal status. Infeasible and
    /// unbounded are *statuses*, not errors; this covers everything else.
    #[error("the solver failed: {reason}")]
    Solver { reason: String },
}
