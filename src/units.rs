pub mod currency;
pub mod energy;
pub mod power;
pub mod rate;

pub use self::{currency::Euro, energy::KilowattHours, power::Kilowatts, rate::EuroPerKilowattHour};
