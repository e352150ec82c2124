use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{LedgerError, Result};

/// number of months in an academic cycle
pub const MONTHS_PER_CYCLE: usize = 12;

/// calendar month (0-based, chrono `month0`) on which every cycle starts
pub const CYCLE_START_MONTH0: u32 = 4;

/// academic months in cycle order; derived `Ord` follows that order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AcademicMonth {
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
    January,
    February,
    March,
    April,
}

impl AcademicMonth {
    pub const ALL: [AcademicMonth; MONTHS_PER_CYCLE] = [
        AcademicMonth::May,
        AcademicMonth::June,
        AcademicMonth::July,
        AcademicMonth::August,
        AcademicMonth::September,
        AcademicMonth::October,
        AcademicMonth::November,
        AcademicMonth::December,
        AcademicMonth::January,
        AcademicMonth::February,
        AcademicMonth::March,
        AcademicMonth::April,
    ];

    /// position within the cycle, 0 = May .. 11 = April
    pub fn academic_index(self) -> usize {
        self as usize
    }

    pub fn from_academic_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// map a chrono `month0` (0 = January) onto the academic month
    pub fn from_month0(month0: u32) -> Result<Self> {
        let index = academic_index_of(month0)?;
        Ok(Self::ALL[index])
    }

    pub fn of_date(date: NaiveDate) -> Self {
        Self::ALL[shift(date.month0())]
    }

    /// chrono `month0` of this month (0 = January)
    pub fn month0(self) -> u32 {
        (self.academic_index() as u32 + CYCLE_START_MONTH0) % MONTHS_PER_CYCLE as u32
    }

    /// true for May..December, the months that fall in the cycle's start year
    pub fn in_start_year(self) -> bool {
        self.academic_index() < 8
    }

    pub fn name(self) -> &'static str {
        match self {
            AcademicMonth::May => "May",
            AcademicMonth::June => "June",
            AcademicMonth::July => "July",
            AcademicMonth::August => "August",
            AcademicMonth::September => "September",
            AcademicMonth::October => "October",
            AcademicMonth::November => "November",
            AcademicMonth::December => "December",
            AcademicMonth::January => "January",
            AcademicMonth::February => "February",
            AcademicMonth::March => "March",
            AcademicMonth::April => "April",
        }
    }
}

impl fmt::Display for AcademicMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AcademicMonth {
    type Err = LedgerError;

    /// accepts full names and three letter abbreviations, any case
    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|m| {
                let name = m.name().to_ascii_lowercase();
                name == wanted || (wanted.len() == 3 && name.starts_with(&wanted))
            })
            .ok_or_else(|| LedgerError::InvalidDate {
                message: format!("unknown month name: {:?}", s),
            })
    }
}

fn shift(month0: u32) -> usize {
    ((month0 + MONTHS_PER_CYCLE as u32 - CYCLE_START_MONTH0) % MONTHS_PER_CYCLE as u32) as usize
}

/// academic index (0 = May .. 11 = April) of a 0-based calendar month
pub fn academic_index_of(calendar_month_index: u32) -> Result<usize> {
    if calendar_month_index >= MONTHS_PER_CYCLE as u32 {
        return Err(LedgerError::InvalidDate {
            message: format!("calendar month index {} out of range 0..11", calendar_month_index),
        });
    }
    Ok(shift(calendar_month_index))
}

/// year label stored on fee records for a calendar month.
/// records carry the calendar year the month falls in, so this is the
/// calendar year itself for every month.
pub fn academic_year_for(calendar_month_index: u32, calendar_year: i32) -> Result<i32> {
    academic_index_of(calendar_month_index)?;
    Ok(calendar_year)
}

/// academic months from May through the month of `now`, inclusive
pub fn months_elapsed_as_of(now: NaiveDate) -> usize {
    AcademicMonth::of_date(now).academic_index() + 1
}

/// one May..April cycle, identified by the calendar year it starts in.
///
/// fee records carry the calendar year their month falls in, so May..December
/// carry the start year and January..April the start year + 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AcademicCycle {
    pub start_year: i32,
}

impl AcademicCycle {
    pub fn starting(start_year: i32) -> Self {
        Self { start_year }
    }

    /// the cycle a calendar date falls in
    pub fn containing(date: NaiveDate) -> Self {
        if date.month0() >= CYCLE_START_MONTH0 {
            Self::starting(date.year())
        } else {
            Self::starting(date.year() - 1)
        }
    }

    /// the cycle a (month, record year) pair belongs to
    pub fn of_slot(month: AcademicMonth, year: i32) -> Self {
        if month.in_start_year() {
            Self::starting(year)
        } else {
            Self::starting(year - 1)
        }
    }

    /// calendar year carried by fee records for `month` in this cycle
    pub fn year_of(&self, month: AcademicMonth) -> i32 {
        if month.in_start_year() {
            self.start_year
        } else {
            self.start_year + 1
        }
    }

    pub fn contains(&self, month: AcademicMonth, year: i32) -> bool {
        self.year_of(month) == year
    }

    /// every (month, year) slot of the cycle in academic order
    pub fn slots(&self) -> impl Iterator<Item = (AcademicMonth, i32)> + '_ {
        AcademicMonth::ALL.iter().map(move |m| (*m, self.year_of(*m)))
    }

    pub fn next(&self) -> Self {
        Self::starting(self.start_year + 1)
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.start_year, CYCLE_START_MONTH0 + 1, 1)
    }

    pub fn last_day(&self) -> Option<NaiveDate> {
        self.next().first_day().and_then(|d| d.pred_opt())
    }

    /// e.g. "2024-25"
    pub fn label(&self) -> String {
        format!("{}-{:02}", self.start_year, (self.start_year + 1).rem_euclid(100))
    }
}

impl fmt::Display for AcademicCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_academic_index_is_bijection() {
        let indices: HashSet<usize> = (0..12).map(|m| academic_index_of(m).unwrap()).collect();
        assert_eq!(indices.len(), 12);
        assert!(indices.iter().all(|i| *i < 12));

        // stable across calls
        for m in 0..12 {
            assert_eq!(academic_index_of(m).unwrap(), academic_index_of(m).unwrap());
        }
    }

    #[test]
    fn test_fixed_mapping() {
        assert_eq!(academic_index_of(4).unwrap(), 0); // may
        assert_eq!(academic_index_of(11).unwrap(), 7); // december
        assert_eq!(academic_index_of(0).unwrap(), 8); // january
        assert_eq!(academic_index_of(3).unwrap(), 11); // april
        assert!(academic_index_of(12).is_err());
    }

    #[test]
    fn test_month0_roundtrip() {
        for month in AcademicMonth::ALL {
            assert_eq!(AcademicMonth::from_month0(month.month0()).unwrap(), month);
        }
        assert_eq!(AcademicMonth::April.month0(), 3);
    }

    #[test]
    fn test_month_order() {
        assert!(AcademicMonth::May < AcademicMonth::December);
        assert!(AcademicMonth::December < AcademicMonth::January);
        assert!(AcademicMonth::January < AcademicMonth::April);
    }

    #[test]
    fn test_parse_month_names() {
        assert_eq!("september".parse::<AcademicMonth>().unwrap(), AcademicMonth::September);
        assert_eq!("Jan".parse::<AcademicMonth>().unwrap(), AcademicMonth::January);
        assert_eq!(" APRIL ".parse::<AcademicMonth>().unwrap(), AcademicMonth::April);
        assert!("Ma".parse::<AcademicMonth>().is_err());
        assert!("Smarch".parse::<AcademicMonth>().is_err());
    }

    #[test]
    fn test_months_elapsed() {
        assert_eq!(months_elapsed_as_of(date(2024, 5, 1)), 1);
        assert_eq!(months_elapsed_as_of(date(2024, 7, 15)), 3);
        assert_eq!(months_elapsed_as_of(date(2025, 1, 31)), 9);
        assert_eq!(months_elapsed_as_of(date(2025, 4, 30)), 12);
    }

    #[test]
    fn test_cycle_year_convention() {
        let cycle = AcademicCycle::containing(date(2025, 2, 10));
        assert_eq!(cycle.start_year, 2024);
        assert_eq!(cycle.year_of(AcademicMonth::November), 2024);
        assert_eq!(cycle.year_of(AcademicMonth::February), 2025);
        assert!(cycle.contains(AcademicMonth::March, 2025));
        assert!(!cycle.contains(AcademicMonth::March, 2024));

        assert_eq!(AcademicCycle::of_slot(AcademicMonth::January, 2025), cycle);
        assert_eq!(AcademicCycle::of_slot(AcademicMonth::May, 2024), cycle);

        // academic year label for a calendar month is the calendar year itself
        assert_eq!(academic_year_for(1, 2025).unwrap(), 2025);
        assert_eq!(academic_year_for(6, 2024).unwrap(), 2024);
    }

    #[test]
    fn test_cycle_bounds() {
        let cycle = AcademicCycle::starting(2023);
        assert_eq!(cycle.first_day(), Some(date(2023, 5, 1)));
        assert_eq!(cycle.last_day(), Some(date(2024, 4, 30)));
        assert_eq!(cycle.label(), "2023-24");
        assert_eq!(cycle.slots().count(), 12);
        assert_eq!(cycle.slots().last(), Some((AcademicMonth::April, 2024)));
    }
}
