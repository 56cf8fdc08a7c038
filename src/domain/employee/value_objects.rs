use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::errors::DateRangeError;

/// Identity of an employee, assigned by the store on insertion
///
/// Two employees with identical names and emails are still distinct;
/// equality is only ever decided by this identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmployeeId(i64);

impl EmployeeId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Arrival and departure dates of an employee
///
/// # Invariants
/// - When both dates are set, arrival <= departure
/// - Either date may be absent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTenure")]
pub struct Tenure {
    arrival: Option<NaiveDate>,
    departure: Option<NaiveDate>,
}

/// Unchecked wire form; deserialization goes through `Tenure::new`
#[derive(Deserialize)]
struct RawTenure {
    arrival: Option<NaiveDate>,
    departure: Option<NaiveDate>,
}

impl TryFrom<RawTenure> for Tenure {
    type Error = DateRangeError;

    fn try_from(raw: RawTenure) -> Result<Self, Self::Error> {
        Tenure::new(raw.arrival, raw.departure)
    }
}

impl Tenure {
    /// Creates a tenure, rejecting a departure that precedes the arrival
    ///
    /// # Example
    /// ```
    /// use chrono::NaiveDate;
    /// use personnel::domain::employee::Tenure;
    ///
    /// let arrival = NaiveDate::from_ymd_opt(2020, 1, 1);
    /// let departure = NaiveDate::from_ymd_opt(2019, 1, 1);
    /// assert!(Tenure::new(arrival, departure).is_err());
    /// ```
    pub fn new(
        arrival: Option<NaiveDate>,
        departure: Option<NaiveDate>,
    ) -> Result<Self, DateRangeError> {
        Tenure::default().with_arrival(arrival)?.with_departure(departure)
    }

    pub fn arrival(&self) -> Option<NaiveDate> {
        self.arrival
    }

    pub fn departure(&self) -> Option<NaiveDate> {
        self.departure
    }

    /// Returns a copy with a new arrival date
    ///
    /// Fails if a departure is set and the new arrival is after it.
    pub fn with_arrival(self, arrival: Option<NaiveDate>) -> Result<Self, DateRangeError> {
        if let (Some(arrival), Some(departure)) = (arrival, self.departure) {
            if arrival > departure {
                return Err(DateRangeError::ArrivalAfterDeparture { arrival, departure });
            }
        }
        Ok(Self { arrival, ..self })
    }

    /// Returns a copy with a new departure date
    ///
    /// Fails if an arrival is set and the new departure is before it.
    pub fn with_departure(self, departure: Option<NaiveDate>) -> Result<Self, DateRangeError> {
        if let (Some(arrival), Some(departure)) = (self.arrival, departure) {
            if departure < arrival {
                return Err(DateRangeError::DepartureBeforeArrival { arrival, departure });
            }
        }
        Ok(Self { departure, ..self })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn empty_tenure_accepts_any_date() {
        let tenure = Tenure::default().with_arrival(Some(date(2021, 5, 1))).unwrap();
        assert_eq!(tenure.arrival(), Some(date(2021, 5, 1)));

        let tenure = Tenure::default().with_departure(Some(date(1999, 1, 1))).unwrap();
        assert_eq!(tenure.departure(), Some(date(1999, 1, 1)));
    }

    #[test]
    fn arrival_after_departure_fails() {
        let tenure = Tenure::new(None, Some(date(2020, 1, 1))).unwrap();
        let result = tenure.with_arrival(Some(date(2020, 1, 2)));

        assert_eq!(
            result,
            Err(DateRangeError::ArrivalAfterDeparture {
                arrival: date(2020, 1, 2),
                departure: date(2020, 1, 1),
            })
        );
    }

    #[test]
    fn departure_before_arrival_fails() {
        let tenure = Tenure::new(Some(date(2020, 6, 1)), None).unwrap();
        let result = tenure.with_departure(Some(date(2020, 5, 31)));

        assert!(matches!(
            result,
            Err(DateRangeError::DepartureBeforeArrival { .. })
        ));
    }

    #[test]
    fn same_day_arrival_and_departure_is_valid() {
        let day = date(2022, 3, 14);
        let tenure = Tenure::new(Some(day), Some(day)).unwrap();
        assert_eq!(tenure.arrival(), tenure.departure());
    }

    #[test]
    fn clearing_a_date_is_always_valid() {
        let tenure = Tenure::new(Some(date(2020, 1, 1)), Some(date(2021, 1, 1))).unwrap();
        let tenure = tenure.with_arrival(None).unwrap();

        assert!(tenure.arrival().is_none());
        assert!(tenure.with_departure(Some(date(1900, 1, 1))).is_ok());
    }

    #[test]
    fn deserializing_an_inverted_tenure_fails() {
        let json = r#"{"arrival":"2024-01-01","departure":"2020-01-01"}"#;
        let result: Result<Tenure, _> = serde_json::from_str(json);

        let error = result.unwrap_err().to_string();
        assert!(error.contains("invalid arrival"), "{}", error);
    }

    #[test]
    fn tenure_serde_keeps_dates() {
        let tenure = Tenure::new(Some(date(2020, 1, 1)), Some(date(2021, 1, 1))).unwrap();
        let json = serde_json::to_string(&tenure).unwrap();

        let restored: Tenure = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, tenure);
    }

    #[test]
    fn employee_id_display() {
        assert_eq!(EmployeeId::new(42).to_string(), "42");
    }
}
