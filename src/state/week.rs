//! Game week identifiers.
//!
//! A week is identified by the calendar date of its Friday, rendered as
//! `DD/MM/YYYY` in the persisted document. Monday to Friday map onto the same
//! week's Friday, Saturday and Sunday roll over to the following Friday.

use std::{fmt, str::FromStr};

use serde_with::{DeserializeFromStr, SerializeDisplay};
use thiserror::Error;
use time::{Date, Duration, Month};

/// Canonical identifier of a game week (the Friday closing it).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, SerializeDisplay, DeserializeFromStr,
)]
pub struct WeekKey(Date);

/// Failure to parse a `DD/MM/YYYY` week key.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WeekKeyError {
    #[error("week key `{0}` is not in DD/MM/YYYY form")]
    Format(String),
    #[error("week key `{0}` is not a valid calendar date")]
    Date(String),
}

impl WeekKey {
    /// Week containing `date`.
    pub fn for_date(date: Date) -> Self {
        let from_monday = i64::from(date.weekday().number_days_from_monday());
        let until_friday = (4 - from_monday).rem_euclid(7);
        Self(date + Duration::days(until_friday))
    }

    /// Friday closing this week.
    pub fn friday(&self) -> Date {
        self.0
    }
}

impl fmt::Display for WeekKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}/{:02}/{:04}",
            self.0.day(),
            u8::from(self.0.month()),
            self.0.year()
        )
    }
}

impl FromStr for WeekKey {
    type Err = WeekKeyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let format_err = || WeekKeyError::Format(value.to_string());

        let mut parts = value.trim().split('/');
        let (Some(day), Some(month), Some(year), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(format_err());
        };

        let day = day.parse::<u8>().map_err(|_| format_err())?;
        let month = month.parse::<u8>().map_err(|_| format_err())?;
        let year = year.parse::<i32>().map_err(|_| format_err())?;

        let month = Month::try_from(month).map_err(|_| WeekKeyError::Date(value.to_string()))?;
        Date::from_calendar_date(year, month, day)
            .map(Self)
            .map_err(|_| WeekKeyError::Date(value.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn weekdays_map_to_the_same_friday() {
        let friday = date!(2024 - 01 - 05);
        for day in [
            date!(2024 - 01 - 01),
            date!(2024 - 01 - 03),
            date!(2024 - 01 - 05),
        ] {
            assert_eq!(WeekKey::for_date(day).friday(), friday);
        }
    }

    #[test]
    fn weekend_rolls_over_to_next_friday() {
        assert_eq!(
            WeekKey::for_date(date!(2024 - 01 - 06)).friday(),
            date!(2024 - 01 - 12)
        );
        assert_eq!(
            WeekKey::for_date(date!(2024 - 01 - 07)).friday(),
            date!(2024 - 01 - 12)
        );
    }

    #[test]
    fn rolls_over_month_and_year_boundaries() {
        assert_eq!(
            WeekKey::for_date(date!(2024 - 12 - 29)).to_string(),
            "03/01/2025"
        );
    }

    #[test]
    fn display_and_parse_agree() {
        let key: WeekKey = "05/01/2024".parse().unwrap();
        assert_eq!(key.friday(), date!(2024 - 01 - 05));
        assert_eq!(key.to_string(), "05/01/2024");
    }

    #[test]
    fn rejects_malformed_keys() {
        assert!(matches!(
            "2024-01-05".parse::<WeekKey>(),
            Err(WeekKeyError::Format(_))
        ));
        assert!(matches!(
            "05/01/2024/1".parse::<WeekKey>(),
            Err(WeekKeyError::Format(_))
        ));
        assert!(matches!(
            "31/02/2024".parse::<WeekKey>(),
            Err(WeekKeyError::Date(_))
        ));
    }

    #[test]
    fn orders_chronologically_across_years() {
        let december: WeekKey = "29/12/2023".parse().unwrap();
        let january: WeekKey = "05/01/2024".parse().unwrap();
        assert!(january > december);
    }

    #[test]
    fn serializes_as_string() {
        let key: WeekKey = "05/01/2024".parse().unwrap();
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"05/01/2024\"");
        let back: WeekKey = serde_json::from_str("\"05/01/2024\"").unwrap();
        assert_eq!(back, key);
    }
}
