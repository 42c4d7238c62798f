use std::{io::Read, ops::RangeInclusive, path::Path};

use serde::{Deserialize, Deserializer};

use crate::{
    error::ZebuError,
    units::{EuroPerKilowattHour, KilowattHours},
};

/// Columns that must be present in the input table. `DateTime` is
/// informational and therefore optional.
const REQUIRED_COLUMNS: [&str; 4] =
    ["Truck", "Solar_production_kWh", "Energy_consumption_kWh", "Price_per_kWh"];

/// One time step of the input series. The sequence is contiguous and
/// regularly spaced; every index stands for one hour.
#[derive(Clone, Debug, Deserialize)]
pub struct Record {
    #[serde(rename = "DateTime", default)]
    pub time: String,

    /// Whether the truck is present and pluggable at this step.
    #[serde(rename = "Truck", deserialize_with = "deserialize_flag")]
    pub truck_connected: bool,

    #[serde(rename = "Solar_production_kWh")]
    pub solar: KilowattHours,

    #[serde(rename = "Energy_consumption_kWh")]
    pub load: KilowattHours,

    #[serde(rename = "Price_per_kWh")]
    pub price: EuroPerKilowattHour,
}

fn deserialize_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(u8::deserialize(deserializer)? != 0)
}

/// Ordered sequence of records, decoupled from any tabular-data library.
/// Access is by integer index only.
#[derive(Clone, Debug, Default)]
pub struct TimeSeries(Vec<Record>);

impl TimeSeries {
    pub fn from_path(path: &Path) -> Result<Self, ZebuError> {
        Self::from_csv(csv::Reader::from_path(path)?)
    }

    pub fn from_reader(reader: impl Read) -> Result<Self, ZebuError> {
        Self::from_csv(csv::Reader::from_reader(reader))
    }

    /// Validates the schema up front: a missing required column aborts before
    /// any row is parsed.
    fn from_csv<R: Read>(mut reader: csv::Reader<R>) -> Result<Self, ZebuError> {
        let headers = reader.headers()?.clone();
        for column in REQUIRED_COLUMNS {
            if !headers.iter().any(|header| header == column) {
                return Err(ZebuError::Schema { column });
            }
        }
        let records = reader.deserialize().collect::<Result<Vec<Record>, _>>()?;
        Ok(Self(records))
    }

    #[must_use]
    pub const fn from_records(records: Vec<Record>) -> Self {
        Self(records)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.0
    }

    #[must_use]
    pub fn slice(&self, range: RangeInclusive<usize>) -> &[Record] {
        &self.0[range]
    }

    /// The `Truck` column as booleans, in series order.
    #[must_use]
    pub fn connectivity(&self) -> Vec<bool> {
        self.0.iter().map(|record| record.truck_connected).collect()
    }

    /// A copy of the series with the solar column scaled, for the
    /// solar-capacity sweep. Everything else is untouched.
    #[must_use]
    pub fn with_scaled_solar(&self, multiplier: f64) -> Self {
        Self(
            self.0
                .iter()
                .map(|record| Record { solar: record.solar * multiplier, ..record.clone() })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    const SAMPLE: &str = "\
DateTime,Truck,Solar_production_kWh,Energy_consumption_kWh,Price_per_kWh
2024-01-01 00:00,1,10.0,5.0,0.1
2024-01-01 01:00,0,0.0,5.0,-0.02
";

    #[test]
    fn test_from_reader() {
        let series = TimeSeries::from_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.connectivity(), [true, false]);
        assert_abs_diff_eq!(series.records()[0].solar.0, 10.0);
        assert_abs_diff_eq!(series.records()[1].price.0, -0.02);
    }

    #[test]
    fn test_missing_column_is_fatal() {
        let csv = "DateTime,Truck,Solar_production_kWh,Energy_consumption_kWh\n2024,1,1.0,1.0\n";
        let error = TimeSeries::from_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(error, ZebuError::Schema { column: "Price_per_kWh" }));
    }

    #[test]
    fn test_missing_datetime_is_fine() {
        let csv = "Truck,Solar_production_kWh,Energy_consumption_kWh,Price_per_kWh\n1,1.0,1.0,0.5\n";
        let series = TimeSeries::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(series.len(), 1);
    }

    #[test]
    fn test_scaled_solar() {
        let series = TimeSeries::from_reader(SAMPLE.as_bytes()).unwrap();
        let scaled = series.with_scaled_solar(1.5);
        assert_abs_diff_eq!(scaled.records()[0].solar.0, 15.0);
        assert_abs_diff_eq!(scaled.records()[0].load.0, 5.0);
    }
}
