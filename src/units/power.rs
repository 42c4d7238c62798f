use std::fmt::{Display, Formatter};

use serde::Deserialize;

use crate::units::KilowattHours;

/// Power in kilowatts.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    PartialEq,
    PartialOrd,
    derive_more::Add,
    derive_more::From,
    derive_more::FromStr,
    derive_more::Neg,
    derive_more::Sub,
)]
pub struct Kilowatts(pub f64);

impl Kilowatts {
    /// Energy moved over one data step (steps are hourly).
    pub const fn over_step(self) -> KilowattHours {
        KilowattHours(self.0)
    }
}

impl Display for Kilowatts {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.0} kW", self.0)
    }
}
