use std::fmt::{Display, Formatter};

use serde::Deserialize;

use crate::units::{Euro, KilowattHours};

/// Euro per kilowatt-hour. Negative rates are legal: the grid sometimes pays
/// for consumption.
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
pub struct EuroPerKilowattHour(pub f64);

impl Display for EuroPerKilowattHour {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3} €/kWh", self.0)
    }
}

impl std::ops::Mul<KilowattHours> for EuroPerKilowattHour {
    type Output = Euro;

    fn mul(self, rhs: KilowattHours) -> Self::Output {
        Euro(self.0 * rhs.0)
    }
}
