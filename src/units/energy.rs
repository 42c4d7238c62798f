use std::{
    fmt::{Display, Formatter},
    ops::{Div, Mul},
};

use serde::Deserialize;

use crate::units::{Euro, EuroPerKilowattHour};

/// Energy in kilowatt-hours. One data index spans one hour, so a per-step
/// energy and a power bound in kilowatts are numerically interchangeable.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    PartialEq,
    PartialOrd,
    derive_more::Add,
    derive_more::AddAssign,
    derive_more::From,
    derive_more::FromStr,
    derive_more::Neg,
    derive_more::Sub,
    derive_more::SubAssign,
    derive_more::Sum,
)]
pub struct KilowattHours(pub f64);

impl KilowattHours {
    pub const ZERO: Self = Self(0.0);

    pub fn max(self, rhs: Self) -> Self {
        if rhs > self { rhs } else { self }
    }
}

impl Display for KilowattHours {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1} kWh", self.0)
    }
}

impl Mul<EuroPerKilowattHour> for KilowattHours {
    type Output = Euro;

    fn mul(self, rhs: EuroPerKilowattHour) -> Self::Output {
        Euro(self.0 * rhs.0)
    }
}

impl Mul<f64> for KilowattHours {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl Div<f64> for KilowattHours {
    type Output = Self;

    fn div(self, rhs: f64) -> Self::Output {
        Self(self.0 / rhs)
    }
}
